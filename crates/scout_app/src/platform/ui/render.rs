use scout_core::{
    AppViewModel, AtsResult, JobRowView, Profile, Remote, ResumeRecord, Severity, StatusLine,
    Suggestion, TaskRowView,
};

/// Which part of the view a command prints once it settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Jobs,
    Resumes,
    Ats,
    Profile,
    Session,
}

/// Lines to print while requests are in flight: the status line and the
/// task table, each only when it changed since `previous`.
pub fn render_updates(previous: &AppViewModel, view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    if view.search.tasks != previous.search.tasks && !view.search.tasks.is_empty() {
        lines.extend(view.search.tasks.iter().map(format_task_row));
    }
    if view.status != previous.status {
        if let Some(status) = &view.status {
            lines.push(format_status(status));
        }
    }
    lines
}

pub fn render_section(view: &AppViewModel, section: Section) -> Vec<String> {
    match section {
        Section::Jobs => view.jobs.iter().flat_map(format_job).collect(),
        Section::Resumes => render_resumes(&view.resumes),
        Section::Ats => {
            let mut lines = render_score(&view.ats_score);
            lines.extend(render_suggestions(&view.suggestions));
            lines
        }
        Section::Profile => view.profile.as_ref().map(render_profile).unwrap_or_default(),
        Section::Session => vec![match &view.session {
            Some(user) => {
                let who = user.email.as_deref().unwrap_or(&user.uid);
                match &user.provider {
                    Some(provider) => format!("Signed in as {who} ({provider})"),
                    None => format!("Signed in as {who}"),
                }
            }
            None => "Not signed in".to_string(),
        }],
    }
}

pub fn format_status(status: &StatusLine) -> String {
    match status.severity {
        Severity::Info => status.text.clone(),
        Severity::Error => format!("error: {}", status.text),
    }
}

fn format_task_row(task: &TaskRowView) -> String {
    format!("  {:<8}  {:<12}  {}", task.short_id, task.spider, task.status)
}

fn format_job(job: &JobRowView) -> Vec<String> {
    let mut details = vec![job.source.clone()];
    details.extend(job.published.clone());
    details.extend(job.salary.clone());
    vec![
        format!("{} | {} | {}", job.title, job.company, job.location),
        format!("    {}", details.join(" | ")),
        format!("    {}", job.url),
    ]
}

fn render_score(score: &Remote<AtsResult>) -> Vec<String> {
    let result = match score {
        Remote::Ready(result) => result,
        Remote::Missing => return vec!["No ATS score yet.".to_string()],
        _ => return Vec::new(),
    };
    let mut lines = vec![format!("ATS score: {:.1}", result.score)];
    if !result.matched_keywords.is_empty() {
        lines.push(format!("Matched: {}", result.matched_keywords.join(", ")));
    }
    if !result.missing_keywords.is_empty() {
        lines.push(format!("Missing: {}", result.missing_keywords.join(", ")));
    }
    lines.extend(result.suggestions.iter().map(|tip| format!("  - {tip}")));
    if let Some(notes) = &result.notes {
        lines.push(format!("Notes: {notes}"));
    }
    lines
}

fn render_suggestions(suggestions: &Remote<Vec<Suggestion>>) -> Vec<String> {
    let suggestions = match suggestions {
        Remote::Ready(suggestions) => suggestions,
        Remote::Missing => return vec!["No suggestions yet.".to_string()],
        _ => return Vec::new(),
    };
    let mut lines = vec!["Suggestions:".to_string()];
    for suggestion in suggestions {
        match &suggestion.description {
            Some(description) => lines.push(format!("  - {}: {}", suggestion.improve, description)),
            None => lines.push(format!("  - {}", suggestion.improve)),
        }
        if let Some(example) = &suggestion.example {
            lines.push(format!("      e.g. {example}"));
        }
    }
    lines
}

fn render_profile(profile: &Profile) -> Vec<String> {
    let mut lines = vec![profile.display_name()];
    if !profile.email.is_empty() {
        lines.push(format!("email:         {}", profile.email));
    }
    let scalars = [
        ("phone_number", &profile.phone_number),
        ("github_link", &profile.github_link),
        ("linkedin_link", &profile.linkedin_link),
        ("bio", &profile.bio),
    ];
    for (name, value) in scalars {
        if let Some(value) = value {
            lines.push(format!("{:<14} {}", format!("{name}:"), value));
        }
    }
    for (name, items) in [("skills", &profile.skills), ("languages", &profile.languages)] {
        if items.is_empty() {
            continue;
        }
        lines.push(format!("{name}:"));
        lines.extend(
            items
                .iter()
                .enumerate()
                .map(|(index, item)| format!("  [{index}] {item}")),
        );
    }
    lines
}

fn render_resumes(resumes: &Remote<Vec<ResumeRecord>>) -> Vec<String> {
    match resumes {
        Remote::Ready(records) => records
            .iter()
            .map(|record| {
                let state = if record.parsed { "parsed" } else { "not parsed" };
                format!("- {} ({state})", record.file_url)
            })
            .collect(),
        Remote::Missing => vec!["No résumé uploaded yet.".to_string()],
        _ => Vec::new(),
    }
}
