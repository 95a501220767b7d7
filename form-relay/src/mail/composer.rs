//! Message composition.
//!
//! Produces the exact bytes handed to the relay: a fixed header block
//! (From, To, Subject, Reply-To), a blank line, then a plain-text body.
//! Every line ends in CRLF.

use crate::config::Config;
use crate::submission::Submission;

/// Subject used when the submission leaves it blank.
pub const DEFAULT_SUBJECT: &str = "New Form Submission";

const CRLF: &str = "\r\n";

/// A fully rendered message plus the envelope it travels in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Envelope sender (MAIL FROM)
    pub sender: String,
    /// Envelope recipient (RCPT TO)
    pub recipient: String,
    /// Header fields in emission order
    pub headers: Vec<(&'static str, String)>,
    /// Body text, CRLF terminated lines
    pub body: String,
}

impl OutgoingEmail {
    /// Look up a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Render headers and body as a single message.
    pub fn formatted(&self) -> String {
        let mut out = String::with_capacity(self.body.len() + 256);
        for (name, value) in &self.headers {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push_str(CRLF);
        }
        out.push_str(CRLF);
        out.push_str(&self.body);
        out
    }
}

/// Build the message for one submission.
pub fn compose(submission: &Submission, config: &Config) -> OutgoingEmail {
    let subject = if submission.subject.is_empty() {
        DEFAULT_SUBJECT
    } else {
        submission.subject.as_str()
    };

    let headers = vec![
        ("From", header_value(&config.smtp_username)),
        ("To", header_value(&config.recipient_email)),
        ("Subject", header_value(subject)),
        ("Reply-To", header_value(&submission.email)),
    ];

    let body = format!(
        "Name: {name}{CRLF}Email: {email}{CRLF}{CRLF}{message}",
        name = header_value(&submission.name),
        email = header_value(&submission.email),
        message = normalize_line_endings(&submission.message),
    );

    OutgoingEmail {
        sender: config.smtp_username.clone(),
        recipient: config.recipient_email.clone(),
        headers,
        body,
    }
}

/// Flatten a value onto one line so it cannot start a new header.
fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// Convert bare LF and lone CR to CRLF.
fn normalize_line_endings(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str(CRLF);
            }
            '\n' => out.push_str(CRLF),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn test_config() -> Config {
        let vars = HashMap::from([
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_USERNAME", "forms@example.com"),
            ("SMTP_PASSWORD", "hunter2"),
            ("RECIPIENT_EMAIL", "inbox@example.com"),
            ("API_KEY", "secret123"),
        ]);
        Config::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap()
    }

    fn submission(subject: &str, message: &str) -> Submission {
        Submission {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_headers_in_fixed_order() {
        let email = compose(&submission("Hello", "Hi there"), &test_config());

        let names: Vec<&str> = email.headers.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["From", "To", "Subject", "Reply-To"]);

        assert_eq!(email.header("from"), Some("forms@example.com"));
        assert_eq!(email.header("To"), Some("inbox@example.com"));
        assert_eq!(email.header("Subject"), Some("Hello"));
        assert_eq!(email.header("Reply-To"), Some("ada@example.com"));
    }

    #[test]
    fn test_subject_defaults() {
        let email = compose(&submission("", "Hi"), &test_config());
        assert_eq!(email.header("Subject"), Some(DEFAULT_SUBJECT));
    }

    #[test]
    fn test_envelope_addresses() {
        let email = compose(&submission("", "Hi"), &test_config());

        assert_eq!(email.sender, "forms@example.com");
        assert_eq!(email.recipient, "inbox@example.com");
    }

    #[test]
    fn test_formatted_message() {
        let email = compose(&submission("Hello", "Hi there"), &test_config());

        let expected = "From: forms@example.com\r\n\
                        To: inbox@example.com\r\n\
                        Subject: Hello\r\n\
                        Reply-To: ada@example.com\r\n\
                        \r\n\
                        Name: Ada Lovelace\r\n\
                        Email: ada@example.com\r\n\
                        \r\n\
                        Hi there";
        assert_eq!(email.formatted(), expected);
    }

    #[test]
    fn test_header_injection_flattened() {
        let mut s = submission("Hi\r\nBcc: victim@example.com", "body");
        s.email = "ada@example.com\nCc: other@example.com".to_string();

        let email = compose(&s, &test_config());
        let formatted = email.formatted();

        assert_eq!(email.header("Subject"), Some("Hi  Bcc: victim@example.com"));
        assert!(!formatted.contains("\r\nBcc:"));
        assert!(!formatted.contains("\nCc:"));
    }

    #[test]
    fn test_message_line_endings_normalized() {
        let email = compose(&submission("", "one\ntwo\r\nthree\rfour"), &test_config());
        assert!(email.body.ends_with("one\r\ntwo\r\nthree\r\nfour"));
    }

    #[test]
    fn test_normalize_line_endings_edges() {
        assert_eq!(normalize_line_endings(""), "");
        assert_eq!(normalize_line_endings("\n"), "\r\n");
        assert_eq!(normalize_line_endings("\r"), "\r\n");
        assert_eq!(normalize_line_endings("a\r\n\r\nb"), "a\r\n\r\nb");
    }
}
