//! Mapping of listing records onto local jobs.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::api::RemoteMod;
use crate::config::{ModcraftConfig, MOD_NAME_CHARS};
use crate::error::ErrorKind;
use crate::models::{GeneratedMod, JobFailure, JobHandle, JobPayload, ModStatus};
use crate::util::truncate_chars;

/// Parse a listing timestamp. Accepts RFC 3339 and the naive ISO-8601 form
/// the listing service emits (read as UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

pub fn to_generated_mod(remote: RemoteMod, config: &ModcraftConfig) -> GeneratedMod {
    let timestamp = match remote.timestamp.as_deref().map(parse_timestamp) {
        Some(Some(ts)) => ts,
        _ => {
            tracing::warn!(id = %remote.id, timestamp = ?remote.timestamp, "unusable timestamp");
            DateTime::UNIX_EPOCH
        }
    };

    let raw_status = remote.status.unwrap_or_default();
    let (status, failure) = match ModStatus::parse(&raw_status) {
        Some(ModStatus::Error) => (
            ModStatus::Error,
            Some(JobFailure {
                kind: ErrorKind::RemoteRejected,
                message: "generation failed on the server".into(),
            }),
        ),
        Some(status) => (status, None),
        None => (
            ModStatus::Error,
            Some(JobFailure {
                kind: ErrorKind::RemoteRejected,
                message: format!("unknown status `{raw_status}`"),
            }),
        ),
    };

    let description = remote.description.unwrap_or_default();
    let name = remote
        .name
        .unwrap_or_else(|| truncate_chars(&description, MOD_NAME_CHARS));

    GeneratedMod {
        handle: JobHandle(0),
        id: remote.id.clone(),
        remote_id: Some(remote.id),
        name,
        description,
        version: remote
            .version
            .unwrap_or_else(|| config.default_mod_version.clone()),
        minecraft_version: remote
            .minecraft_version
            .unwrap_or_else(|| config.minecraft_version.clone()),
        timestamp,
        status,
        failure,
        payload: remote.file_url.map(|url| JobPayload::Url { url }),
        texture_url: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn remote(status: &str, timestamp: Option<&str>) -> RemoteMod {
        RemoteMod {
            id: "mod_20250301_120000_abcd1234".into(),
            name: Some("Sword".into()),
            description: Some("A sword".into()),
            version: None,
            minecraft_version: Some("1.19.2".into()),
            timestamp: timestamp.map(Into::into),
            status: Some(status.into()),
            file_url: Some("https://cdn.example/sword.jar".into()),
        }
    }

    #[test]
    fn test_parse_naive_and_rfc3339() {
        let ts = parse_timestamp("2025-03-01T12:30:45.123456").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2025, 3, 1));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (12, 30, 45));

        let ts = parse_timestamp("2025-03-01T12:30:45+03:00").unwrap();
        assert_eq!(ts.hour(), 9);

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_maps_listing_record() {
        let job = to_generated_mod(
            remote("ready", Some("2025-03-01T12:00:00")),
            &ModcraftConfig::default(),
        );
        assert_eq!(job.id, "mod_20250301_120000_abcd1234");
        assert_eq!(job.remote_id.as_deref(), Some(job.id.as_str()));
        assert_eq!(job.status, ModStatus::Ready);
        assert_eq!(job.version, "1.0.0");
        assert_eq!(job.minecraft_version, "1.19.2");
        assert!(job.is_downloadable());
    }

    #[test]
    fn test_unknown_status_and_missing_timestamp() {
        let job = to_generated_mod(remote("queued", None), &ModcraftConfig::default());
        assert_eq!(job.status, ModStatus::Error);
        assert_eq!(job.failure.unwrap().kind, ErrorKind::RemoteRejected);
        assert_eq!(job.timestamp, DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_missing_name_falls_back_to_truncated_description() {
        let record = RemoteMod {
            name: None,
            description: Some("Добавь алмазный меч с двойным уроном и огненной аурой".into()),
            ..remote("ready", Some("2025-03-01T12:00:00"))
        };
        let job = to_generated_mod(record, &ModcraftConfig::default());
        assert_eq!(job.name.chars().count(), MOD_NAME_CHARS);
        assert_eq!(job.name, "Добавь алмазный меч с двойным ");
        assert_eq!(job.description, "Добавь алмазный меч с двойным уроном и огненной аурой");
    }
}
