//! Console output formatter for conversations

use crate::api::{ErrorResponse, ResponseBody, SessionDetailView, SessionSummaryView};
use crate::controller::Outcome;
use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use imgchat_domain::Role;

/// Formats conversation outcomes for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    fn detail(view: &SessionDetailView) -> String {
        let mut output = Self::header(&view.subject_url);
        output.push_str(&format!(
            "{} {}\n",
            "Started:".dimmed(),
            view.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        if view.messages.is_empty() {
            output.push_str(&format!("\n{}\n", "No messages yet.".dimmed()));
        }

        for message in &view.messages {
            let label = match message.role {
                Role::User => "You".cyan().bold(),
                Role::Model => "Model".yellow().bold(),
            };
            output.push_str(&format!(
                "\n{} {}\n{}\n",
                label,
                message.created_at.format("%H:%M:%S").to_string().dimmed(),
                Self::indent(&message.content, "  ")
            ));
        }

        output
    }

    fn summaries(sessions: &[SessionSummaryView]) -> String {
        if sessions.is_empty() {
            return format!("{}\n", "No conversations yet.".dimmed());
        }

        let mut output = format!("{}\n", "Conversations:".cyan().bold());
        for session in sessions {
            output.push_str(&format!(
                "  {} {}\n",
                session.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed(),
                session.subject_url
            ));
        }
        output
    }

    fn error(status: u16, error: &ErrorResponse) -> String {
        format!("{} {}\n", format!("Error ({}):", status).red().bold(), error.error_message)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{}\n{}\n", line.cyan(), title.bold(), line.cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, outcome: &Outcome) -> String {
        match &outcome.body {
            Some(ResponseBody::Reply(reply)) => format!("{}\n", reply.reply_text),
            Some(ResponseBody::Detail(view)) => Self::detail(view),
            Some(ResponseBody::Summaries(list)) => Self::summaries(list),
            Some(ResponseBody::Error(error)) => Self::error(outcome.status.http_status(), error),
            None => String::new(),
        }
    }

    fn format_models(&self, provider: &str, models: &[String]) -> String {
        let mut output = format!("{} {}\n", "Models offered by".cyan().bold(), provider.bold());
        for model in models {
            output.push_str(&format!("  * {}\n", model));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AskResponse, MessageView};
    use crate::controller::StatusCategory;
    use chrono::{TimeZone, Utc};
    use imgchat_application::ErrorCategory;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "  "), "  a\n  b");
    }

    #[test]
    fn test_reply_prints_text_only() {
        plain();
        let outcome = Outcome {
            status: StatusCategory::Created,
            body: Some(ResponseBody::Reply(AskResponse {
                reply_text: "A shiba inu.".to_string(),
            })),
        };
        assert_eq!(ConsoleFormatter.format(&outcome), "A shiba inu.\n");
    }

    #[test]
    fn test_detail_lists_messages_in_order() {
        plain();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let view = SessionDetailView {
            id: 1,
            subject_url: "https://img.example/dog.jpg".to_string(),
            created_at: at,
            messages: vec![
                MessageView {
                    id: 1,
                    role: Role::User,
                    content: "Breed?".to_string(),
                    created_at: at,
                },
                MessageView {
                    id: 2,
                    role: Role::Model,
                    content: "Shiba inu.".to_string(),
                    created_at: at,
                },
            ],
        };
        let text = ConsoleFormatter.format(&Outcome {
            status: StatusCategory::Ok,
            body: Some(ResponseBody::Detail(view)),
        });

        let question = text.find("Breed?").unwrap();
        let answer = text.find("Shiba inu.").unwrap();
        assert!(question < answer);
        assert!(text.contains("https://img.example/dog.jpg"));
    }

    #[test]
    fn test_error_includes_status() {
        plain();
        let text = ConsoleFormatter.format(&Outcome {
            status: StatusCategory::TooManyRequests,
            body: Some(ResponseBody::Error(ErrorResponse {
                error_message: "slow down".to_string(),
                category: ErrorCategory::RateLimited,
            })),
        });
        assert_eq!(text, "Error (429): slow down\n");
    }

    #[test]
    fn test_empty_summaries() {
        plain();
        let text = ConsoleFormatter.format(&Outcome {
            status: StatusCategory::Ok,
            body: Some(ResponseBody::Summaries(vec![])),
        });
        assert!(text.contains("No conversations yet."));
    }
}
