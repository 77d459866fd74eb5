//! Rewrites platform placeholder tokens into strftime-style patterns.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static LEAD_TIME_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%L+").unwrap());

/// `@YYYY@/@MM@/@DD@/@HH@` into `%Y/%m/%d/%H`.
pub fn archive_timestamp_pattern(raw: &str) -> String {
    raw.replace("@YYYY@", "%Y")
        .replace("@MM@", "%m")
        .replace("@DD@", "%d")
        .replace("@HH@", "%H")
}

/// Lead-time placeholders of a duration template: hours become `%LLLL`,
/// minutes and seconds are pinned to `00`.
pub fn duration_pattern(raw: &str) -> String {
    raw.replace("@LLLH@", "%LLLL")
        .replace("@LM@", "00")
        .replace("@LS@", "00")
}

pub fn user_prefix(raw: &str, user: &str) -> String {
    raw.replace("@USER@", user)
}

pub fn archive_outpath(raw: &str, timestamp_pattern: &str) -> String {
    raw.replace("@ARCHIVE_TIMESTAMP@", timestamp_pattern)
}

/// Replaces `resolved` inside `text` with `pattern`, turning a concrete
/// resolved path back into a date pattern.
pub fn restore_pattern(text: &str, resolved: &str, pattern: &str) -> String {
    if resolved.is_empty() {
        return text.to_string();
    }
    text.replace(resolved, pattern)
}

/// Joins a path prefix and a relative part with `/`. An absolute part wins.
pub fn join_remote(prefix: &str, part: &str) -> String {
    if part.starts_with('/') || prefix.is_empty() {
        return part.to_string();
    }
    if prefix.ends_with('/') {
        format!("{prefix}{part}")
    } else {
        format!("{prefix}/{part}")
    }
}

/// Fills each `%L...` run with the lead time zero-padded to the run length
/// minus one, or with `*` when no lead time is given.
pub fn lead_time_pattern(text: &str, lead_time: Option<u32>) -> String {
    LEAD_TIME_RUN
        .replace_all(text, |caps: &Captures<'_>| match lead_time {
            Some(hours) => {
                let width = caps[0].len() - 1;
                format!("{hours:0width$}")
            }
            None => "*".to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_tokens_become_strftime() {
        assert_eq!(
            archive_timestamp_pattern("@YYYY@/@MM@/@DD@_@HH@"),
            "%Y/%m/%d_%H"
        );
    }

    #[test]
    fn duration_tokens() {
        assert_eq!(duration_pattern("+@LLLH@h@LM@m@LS@s"), "+%LLLLh00m00s");
    }

    #[test]
    fn lead_time_padding_and_glob() {
        let template = "GRIBPFDEOD+%LLLLh00m00s";
        assert_eq!(lead_time_pattern(template, Some(6)), "GRIBPFDEOD+0006h00m00s");
        assert_eq!(lead_time_pattern(template, None), "GRIBPFDEOD+*h00m00s");
    }

    #[test]
    fn remote_join_follows_path_rules() {
        assert_eq!(join_remote("ec:/user/deode", "2023/01"), "ec:/user/deode/2023/01");
        assert_eq!(join_remote("ec:/user/deode/", "2023/01"), "ec:/user/deode/2023/01");
        assert_eq!(join_remote("ec:/user/deode", "/abs/2023"), "/abs/2023");
    }
}
