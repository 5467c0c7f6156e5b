//! Command-line surface of `jobscout`.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scout_core::{Msg, ProfileEdit, SignInMode};

use super::ui::render::Section;

#[derive(Debug, Parser)]
#[command(name = "jobscout")]
#[command(about = "Scrape job boards, browse listings and manage your résumé profile")]
pub struct Cli {
    /// Backend base URL (default http://localhost:8000).
    #[arg(long, global = true, env = "JOBSCOUT_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Milliseconds between scrape status checks (default 2000).
    #[arg(
        long,
        global = true,
        env = "JOBSCOUT_POLL_INTERVAL_MS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval_ms: Option<u64>,

    /// Directory holding config.ron, session.ron and jobscout.log.
    #[arg(
        long,
        global = true,
        env = "JOBSCOUT_CONFIG_DIR",
        default_value = ".jobscout"
    )]
    pub config_dir: PathBuf,

    /// Log debug output to the terminal.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse and refresh job listings
    #[command(subcommand)]
    Jobs(JobsCommand),

    /// Upload and inspect résumés
    #[command(subcommand)]
    Resume(ResumeCommand),

    /// ATS score and improvement suggestions
    #[command(subcommand)]
    Ats(AtsCommand),

    /// View and edit your profile
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Sign in and out
    #[command(subcommand)]
    Auth(AuthCommand),
}

#[derive(Debug, Subcommand)]
pub enum JobsCommand {
    /// Print the stored listing
    List,

    /// Scrape the job boards, then print the refreshed listing
    Search {
        #[arg(long)]
        role: String,
        #[arg(long)]
        location: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ResumeCommand {
    /// Upload a résumé, parse it and build a profile from it
    Upload { file: PathBuf },

    /// List uploaded résumés
    Show,
}

#[derive(Debug, Subcommand)]
pub enum AtsCommand {
    /// Score the latest résumé against a job description
    Score {
        /// Job description text, or @path to read it from a file.
        #[arg(long)]
        job_description: String,
    },

    /// Generate improvement suggestions
    Suggest,

    /// Print the stored score and suggestions
    Show,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    Show,

    /// Set a text field; an empty value clears it
    Set { field: String, value: String },

    /// Append to a list field (skills, languages)
    Add { field: String, item: String },

    /// Remove an entry from a list field by index
    Remove { field: String, index: usize },

    /// Replace an entry of a list field by index
    Replace {
        field: String,
        index: usize,
        item: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    Login {
        #[arg(long)]
        id_token: String,
    },
    Signup {
        #[arg(long)]
        id_token: String,
    },
    Logout,
    Status,
}

/// Messages to dispatch for one invocation.
///
/// Each stage must settle (no request outstanding) before the next one starts.
#[derive(Debug, PartialEq)]
pub struct Plan {
    pub stages: Vec<Vec<Msg>>,
    pub section: Section,
}

impl Plan {
    fn single(msgs: Vec<Msg>, section: Section) -> Self {
        Self {
            stages: vec![msgs],
            section,
        }
    }

    /// Load the profile, apply one edit and save.
    fn profile_edit(edit: ProfileEdit) -> Self {
        Self {
            stages: vec![
                vec![Msg::ProfileRequested],
                vec![Msg::ProfileEdited(edit), Msg::ProfileSaveRequested],
            ],
            section: Section::Profile,
        }
    }
}

impl Command {
    pub fn plan(self) -> Result<Plan> {
        let plan = match self {
            Command::Jobs(JobsCommand::List) => {
                Plan::single(vec![Msg::ListingRequested], Section::Jobs)
            }
            Command::Jobs(JobsCommand::Search { role, location }) => Plan::single(
                vec![
                    Msg::RoleChanged(role),
                    Msg::LocationChanged(location),
                    Msg::SearchSubmitted,
                ],
                Section::Jobs,
            ),
            Command::Resume(ResumeCommand::Upload { file }) => Plan::single(
                vec![Msg::ResumeUploadRequested { path: file }],
                Section::Resumes,
            ),
            Command::Resume(ResumeCommand::Show) => {
                Plan::single(vec![Msg::ResumesRequested], Section::Resumes)
            }
            Command::Ats(AtsCommand::Score { job_description }) => Plan::single(
                vec![
                    Msg::JobDescriptionChanged(read_text_arg(&job_description)?),
                    Msg::ScoreRequested,
                ],
                Section::Ats,
            ),
            Command::Ats(AtsCommand::Suggest) => {
                Plan::single(vec![Msg::SuggestRequested], Section::Ats)
            }
            Command::Ats(AtsCommand::Show) => Plan::single(vec![Msg::AtsRequested], Section::Ats),
            Command::Profile(ProfileCommand::Show) => {
                Plan::single(vec![Msg::ProfileRequested], Section::Profile)
            }
            Command::Profile(ProfileCommand::Set { field, value }) => {
                Plan::profile_edit(ProfileEdit::Set { field, value })
            }
            Command::Profile(ProfileCommand::Add { field, item }) => {
                Plan::profile_edit(ProfileEdit::AddItem { field, item })
            }
            Command::Profile(ProfileCommand::Remove { field, index }) => {
                Plan::profile_edit(ProfileEdit::RemoveItem { field, index })
            }
            Command::Profile(ProfileCommand::Replace { field, index, item }) => {
                Plan::profile_edit(ProfileEdit::ReplaceItem { field, index, item })
            }
            Command::Auth(AuthCommand::Login { id_token }) => Plan::single(
                vec![Msg::SignInRequested {
                    id_token,
                    mode: SignInMode::Login,
                }],
                Section::Session,
            ),
            Command::Auth(AuthCommand::Signup { id_token }) => Plan::single(
                vec![Msg::SignInRequested {
                    id_token,
                    mode: SignInMode::Signup,
                }],
                Section::Session,
            ),
            Command::Auth(AuthCommand::Logout) => {
                Plan::single(vec![Msg::SignOutRequested], Section::Session)
            }
            Command::Auth(AuthCommand::Status) => Plan::single(Vec::new(), Section::Session),
        };
        Ok(plan)
    }
}

/// `@path` reads the text from a file.
fn read_text_arg(raw: &str) -> Result<String> {
    match raw.strip_prefix('@') {
        Some(path) => fs::read_to_string(path).with_context(|| format!("could not read {path}")),
        None => Ok(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("jobscout").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn search_plan_fills_inputs_before_submitting() {
        let cli = parse(&["jobs", "search", "--role", "rust dev", "--location", "Pune"]);
        let plan = cli.command.plan().unwrap();
        assert_eq!(
            plan,
            Plan {
                stages: vec![vec![
                    Msg::RoleChanged("rust dev".to_string()),
                    Msg::LocationChanged("Pune".to_string()),
                    Msg::SearchSubmitted,
                ]],
                section: Section::Jobs,
            }
        );
    }

    #[test]
    fn profile_edit_waits_for_the_profile() {
        let cli = parse(&["profile", "add", "skills", "rust"]);
        let plan = cli.command.plan().unwrap();
        assert_eq!(plan.stages.len(), 2);
        assert_eq!(plan.stages[0], vec![Msg::ProfileRequested]);
        assert_eq!(
            plan.stages[1],
            vec![
                Msg::ProfileEdited(ProfileEdit::AddItem {
                    field: "skills".to_string(),
                    item: "rust".to_string(),
                }),
                Msg::ProfileSaveRequested,
            ]
        );
    }

    #[test]
    fn profile_replace_targets_an_index() {
        let cli = parse(&["profile", "replace", "skills", "1", "go"]);
        let plan = cli.command.plan().unwrap();
        assert_eq!(
            plan.stages[1][0],
            Msg::ProfileEdited(ProfileEdit::ReplaceItem {
                field: "skills".to_string(),
                index: 1,
                item: "go".to_string(),
            })
        );
        assert_eq!(plan.section, Section::Profile);
    }

    #[test]
    fn job_description_can_come_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Senior Rust engineer").unwrap();
        let arg = format!("@{}", file.path().display());

        let cli = parse(&["ats", "score", "--job-description", &arg]);
        let plan = cli.command.plan().unwrap();
        assert_eq!(
            plan.stages[0][0],
            Msg::JobDescriptionChanged("Senior Rust engineer".to_string())
        );
    }

    #[test]
    fn missing_job_description_file_is_an_error() {
        let cli = parse(&["ats", "score", "--job-description", "@/no/such/file.txt"]);
        assert!(cli.command.plan().is_err());
    }

    #[test]
    fn global_flags_parse_after_the_subcommand() {
        let cli = parse(&[
            "auth",
            "status",
            "--backend-url",
            "http://api.test",
            "--poll-interval-ms",
            "500",
            "--verbose",
        ]);
        assert_eq!(cli.backend_url.as_deref(), Some("http://api.test"));
        assert_eq!(cli.poll_interval_ms, Some(500));
        assert!(cli.verbose);
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let parsed = Cli::try_parse_from(["jobscout", "jobs", "list", "--poll-interval-ms", "0"]);
        assert!(parsed.is_err());
    }
}
