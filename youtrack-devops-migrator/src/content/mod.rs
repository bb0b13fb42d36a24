//! Destination-ready rich text with provenance.
//!
//! Descriptions and comments are prefixed with a preamble linking back to the
//! source issue and naming the original author and time. Line breaks in the
//! body are then rewritten to the destination's line-break token.
//!
//! No escaping is performed: a body that already contains the line-break
//! token keeps it, and repeated formatting of such text is not idempotent.

mod error;
mod renderer;

pub use error::ContentError;
pub use renderer::create_handlebars_registry;

use crate::config::ContentSettings;
use chrono::DateTime;
use handlebars::Handlebars;
use serde_json::json;
use url::Url;

const DESCRIPTION_TEMPLATE: &str = "description";
const COMMENT_TEMPLATE: &str = "comment";

/// Original author and creation time of a description or comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provenance<'a> {
    /// Source login of the author.
    pub author: &'a str,
    /// Creation time in source epoch milliseconds.
    pub created: i64,
}

/// Formats descriptions and comments for the destination.
pub struct ContentFormatter {
    handlebars: Handlebars<'static>,
    line_break: String,
}

impl ContentFormatter {
    /// Creates a formatter from the `[content]` settings.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::RegistrationError`] if a preamble template is invalid.
    pub fn new(settings: &ContentSettings) -> Result<Self, ContentError> {
        let mut handlebars = create_handlebars_registry();
        handlebars.register_template_string(DESCRIPTION_TEMPLATE, &settings.description_preamble)?;
        handlebars.register_template_string(COMMENT_TEMPLATE, &settings.comment_preamble)?;
        Ok(Self {
            handlebars,
            line_break: settings.line_break.clone(),
        })
    }

    /// Formats an issue description.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] if the preamble cannot be rendered.
    pub fn format_description(
        &self,
        source_base: &Url,
        issue_id: &str,
        body: &str,
        provenance: Provenance<'_>,
    ) -> Result<String, ContentError> {
        self.format(DESCRIPTION_TEMPLATE, source_base, issue_id, body, provenance)
    }

    /// Formats a comment.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] if the preamble cannot be rendered.
    pub fn format_comment(
        &self,
        source_base: &Url,
        issue_id: &str,
        body: &str,
        provenance: Provenance<'_>,
    ) -> Result<String, ContentError> {
        self.format(COMMENT_TEMPLATE, source_base, issue_id, body, provenance)
    }

    /// Appends a link to a relocated attachment to already formatted text.
    #[must_use]
    pub fn append_attachment_link(&self, text: &str, name: &str, url: &str) -> String {
        format!("{text}{}\n<a href=\"{url}\">{name}</a>", self.line_break)
    }

    fn format(
        &self,
        template: &str,
        source_base: &Url,
        issue_id: &str,
        body: &str,
        provenance: Provenance<'_>,
    ) -> Result<String, ContentError> {
        let data = json!({
            "source_url": issue_url(source_base, issue_id),
            "issue_id": issue_id,
            "author": provenance.author,
            "created": format_timestamp(provenance.created)?,
        });
        let preamble = self.handlebars.render(template, &data)?;
        let separator = format!("{}\n", self.line_break);

        Ok(format!(
            "{preamble}{separator}{separator}{}",
            convert_line_breaks(body, &self.line_break)
        ))
    }
}

/// Link to an issue in the source tracker's web UI.
#[must_use]
pub fn issue_url(source_base: &Url, issue_id: &str) -> String {
    format!(
        "{}/issue/{issue_id}",
        source_base.as_str().trim_end_matches('/')
    )
}

/// Renders source epoch milliseconds as a timezone-naive ISO-8601 string.
///
/// Sub-second precision is dropped by flooring division, never rounded.
///
/// # Errors
///
/// Returns [`ContentError::TimestampOutOfRange`] for unrepresentable dates.
pub fn format_timestamp(millis: i64) -> Result<String, ContentError> {
    DateTime::from_timestamp(millis.div_euclid(1000), 0)
        .map(|dt| dt.naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string())
        .ok_or(ContentError::TimestampOutOfRange(millis))
}

/// Rewrites each `\n` as `line_break` followed by `\n`.
#[must_use]
pub fn convert_line_breaks(body: &str, line_break: &str) -> String {
    body.replace('\n', &format!("{line_break}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatter() -> ContentFormatter {
        ContentFormatter::new(&ContentSettings::default()).unwrap()
    }

    fn base() -> Url {
        Url::parse("https://src.example").unwrap()
    }

    #[test]
    fn truncates_sub_second_precision() {
        assert_eq!(format_timestamp(1609459200000).unwrap(), "2021-01-01T00:00:00");
        assert_eq!(
            format_timestamp(1609459200500).unwrap(),
            format_timestamp(1609459200000).unwrap()
        );
        assert_eq!(format_timestamp(1609459200999).unwrap(), "2021-01-01T00:00:00");
        assert_eq!(format_timestamp(1700000000000).unwrap(), "2023-11-14T22:13:20");
    }

    #[test]
    fn negative_timestamps_floor() {
        assert_eq!(format_timestamp(-1).unwrap(), "1969-12-31T23:59:59");
    }

    #[test]
    fn rejects_out_of_range_timestamps() {
        assert!(matches!(
            format_timestamp(i64::MAX),
            Err(ContentError::TimestampOutOfRange(_))
        ));
    }

    #[test]
    fn formats_description_with_preamble() {
        let text = formatter()
            .format_description(
                &base(),
                "DEMO-1",
                "Steps:\nopen\ncrash",
                Provenance {
                    author: "alice",
                    created: 1700000000000,
                },
            )
            .unwrap();

        assert_eq!(
            text,
            "[Migrated from <a href=\"https://src.example/issue/DEMO-1\">YouTrack</a>, \
originally reported by alice on 2023-11-14T22:13:20]<br />\n<br />\n\
Steps:<br />\nopen<br />\ncrash"
        );
    }

    #[test]
    fn formats_comment_with_preamble() {
        let text = formatter()
            .format_comment(
                &base(),
                "DEMO-1",
                "looks good",
                Provenance {
                    author: "bob",
                    created: 100,
                },
            )
            .unwrap();

        assert!(text.starts_with(
            "[Migrated from <a href=\"https://src.example/issue/DEMO-1\">YouTrack</a>. \
Original comment by bob on 1970-01-01T00:00:00]"
        ));
        assert!(text.ends_with("<br />\n<br />\nlooks good"));
    }

    #[test]
    fn formatting_is_repeatable() {
        let f = formatter();
        let provenance = Provenance {
            author: "alice",
            created: 1609459200500,
        };
        let first = f
            .format_description(&base(), "DEMO-2", "a\nb", provenance)
            .unwrap();
        let second = f
            .format_description(&base(), "DEMO-2", "a\nb", provenance)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn does_not_escape_existing_tokens() {
        assert_eq!(
            convert_line_breaks("a<br />\nb", "<br />"),
            "a<br /><br />\nb"
        );
    }

    #[test]
    fn custom_templates_and_token() {
        let settings = ContentSettings {
            line_break: "<br/>".to_string(),
            description_preamble: "From {{issue_id}} by {{author}}".to_string(),
            comment_preamble: "{{author}}:".to_string(),
        };
        let f = ContentFormatter::new(&settings).unwrap();

        let text = f
            .format_description(
                &base(),
                "X-1",
                "one\ntwo",
                Provenance {
                    author: "carol",
                    created: 0,
                },
            )
            .unwrap();
        assert_eq!(text, "From X-1 by carol<br/>\n<br/>\none<br/>\ntwo");
    }

    #[test]
    fn rejects_invalid_template() {
        let settings = ContentSettings {
            description_preamble: "{{#if}}".to_string(),
            ..ContentSettings::default()
        };
        assert!(matches!(
            ContentFormatter::new(&settings),
            Err(ContentError::RegistrationError(_))
        ));
    }

    #[test]
    fn strict_mode_rejects_unknown_variables() {
        let settings = ContentSettings {
            comment_preamble: "{{reporter}}".to_string(),
            ..ContentSettings::default()
        };
        let f = ContentFormatter::new(&settings).unwrap();
        let result = f.format_comment(
            &base(),
            "X-1",
            "",
            Provenance {
                author: "a",
                created: 0,
            },
        );
        assert!(matches!(result, Err(ContentError::RenderError(_))));
    }

    #[test]
    fn appends_attachment_link() {
        let text = formatter().append_attachment_link("body", "x.png", "https://dst/1");
        assert_eq!(text, "body<br />\n<a href=\"https://dst/1\">x.png</a>");
    }
}
