use std::cmp::Ordering;

use crate::JobListing;

/// Buckets that are always concatenated first, in this order.
const PRIMARY_BUCKETS: &[&str] = &["internshala", "linkedin"];

/// Flatten source buckets into one listing and sort it.
///
/// Known buckets come first in a fixed order, the rest follow by key, so the
/// result does not depend on how the buckets were handed in.
pub fn merge_buckets<I>(buckets: I) -> Vec<JobListing>
where
    I: IntoIterator<Item = (String, Vec<JobListing>)>,
{
    let mut buckets: Vec<(String, Vec<JobListing>)> = buckets.into_iter().collect();
    buckets.sort_by(|(a, _), (b, _)| bucket_rank(a).cmp(&bucket_rank(b)).then_with(|| a.cmp(b)));

    let mut jobs: Vec<JobListing> = buckets.into_iter().flat_map(|(_, jobs)| jobs).collect();
    sort_listing(&mut jobs);
    jobs
}

fn bucket_rank(key: &str) -> usize {
    PRIMARY_BUCKETS
        .iter()
        .position(|known| known.eq_ignore_ascii_case(key))
        .unwrap_or(PRIMARY_BUCKETS.len())
}

/// Most recently published first. Undated jobs go last; ties keep their
/// current relative order.
pub fn sort_listing(jobs: &mut [JobListing]) {
    jobs.sort_by(compare_published_desc);
}

fn compare_published_desc(a: &JobListing, b: &JobListing) -> Ordering {
    match (a.published, b.published) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
