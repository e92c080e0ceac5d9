use serde::{Deserialize, Serialize};

/// Root admins are hardcoded and cannot be removed through the settings
/// screen.
pub const ROOT_ADMIN_IDS: &[i64] = &[100200300];

const DEFAULT_START_HOUR: u32 = 9;
const DEFAULT_END_HOUR: u32 = 21;
const DEFAULT_SLOT_DURATION: u32 = 30;
const DEFAULT_POSTS_COUNT: u32 = 2;

/// Operating configuration for the wash. Stored as a single JSON object and
/// overwritten wholesale on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub start_hour: u32,
    pub end_hour: u32,
    /// Minutes per slot.
    pub slot_duration: u32,
    /// How many cars can be washed at the same time.
    pub posts_count: u32,
    /// Admin ids granted through the settings screen, on top of the root list.
    pub additional_admin_ids: Vec<i64>,
    pub bot_token: String,
    pub channel_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
            slot_duration: DEFAULT_SLOT_DURATION,
            posts_count: DEFAULT_POSTS_COUNT,
            additional_admin_ids: Vec::new(),
            bot_token: String::new(),
            channel_id: String::new(),
        }
    }
}

/// Shape of the stored settings record. Every field is optional so that
/// records written by older builds still read cleanly.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoredSettings {
    start_hour: Option<i64>,
    end_hour: Option<i64>,
    slot_duration: Option<i64>,
    posts_count: Option<i64>,
    additional_admin_ids: Option<Vec<i64>>,
    bot_token: Option<String>,
    channel_id: Option<String>,
}

impl Settings {
    /// Build settings from possibly-invalid numeric inputs. Hours are kept
    /// only when they fit 0-23; a missing field takes the default, while a
    /// present-but-invalid duration falls to 30 and a present-but-invalid
    /// bay count collapses to a single bay.
    fn from_parts(
        start_hour: Option<i64>,
        end_hour: Option<i64>,
        slot_duration: Option<i64>,
        posts_count: Option<i64>,
        additional_admin_ids: Vec<i64>,
        bot_token: String,
        channel_id: String,
    ) -> Self {
        Self {
            start_hour: coerce_hour(start_hour, DEFAULT_START_HOUR),
            end_hour: coerce_hour(end_hour, DEFAULT_END_HOUR),
            slot_duration: coerce_positive(
                slot_duration,
                DEFAULT_SLOT_DURATION,
                DEFAULT_SLOT_DURATION,
            ),
            posts_count: coerce_positive(posts_count, DEFAULT_POSTS_COUNT, 1),
            additional_admin_ids,
            bot_token,
            channel_id,
        }
    }

    /// Build settings from the admin form. Every field is present there, so
    /// anything that does not parse counts as invalid rather than missing.
    pub fn from_form(
        start_hour: &str,
        end_hour: &str,
        slot_duration: &str,
        posts_count: &str,
        additional_admin_ids: Vec<i64>,
        bot_token: String,
        channel_id: String,
    ) -> Self {
        Self::from_parts(
            Some(parse_or_invalid(start_hour)),
            Some(parse_or_invalid(end_hour)),
            Some(parse_or_invalid(slot_duration)),
            Some(parse_or_invalid(posts_count)),
            additional_admin_ids,
            bot_token,
            channel_id,
        )
    }

    /// Merge a stored settings record over the defaults, field by field.
    /// A stored value wins when it is valid; anything missing or out of
    /// range falls back to the default. Malformed JSON yields pure defaults.
    pub fn merge_stored(raw: Option<&str>) -> Self {
        let stored: StoredSettings = match raw {
            Some(data) => match serde_json::from_str(data) {
                Ok(parsed) => parsed,
                Err(err) => {
                    log::warn!("Discarding unreadable settings record: {err}");
                    StoredSettings::default()
                }
            },
            None => StoredSettings::default(),
        };

        Self::from_parts(
            stored.start_hour,
            stored.end_hour,
            stored.slot_duration,
            stored.posts_count,
            stored.additional_admin_ids.unwrap_or_default(),
            stored.bot_token.unwrap_or_default(),
            stored.channel_id.unwrap_or_default(),
        )
    }

    /// True when the identity is a root admin or has been granted access
    /// through the settings screen.
    pub fn is_admin(&self, tg_id: i64) -> bool {
        ROOT_ADMIN_IDS.contains(&tg_id) || self.additional_admin_ids.contains(&tg_id)
    }
}

fn coerce_hour(value: Option<i64>, default: u32) -> u32 {
    match value {
        Some(hour) if (0..=23).contains(&hour) => hour as u32,
        _ => default,
    }
}

fn coerce_positive(value: Option<i64>, missing: u32, invalid: u32) -> u32 {
    match value {
        Some(v) if v >= 1 => v as u32,
        Some(_) => invalid,
        None => missing,
    }
}

fn parse_or_invalid(input: &str) -> i64 {
    input.trim().parse::<i64>().unwrap_or(-1)
}

/// Parse the comma-separated admin-id field of the settings form. Entries
/// that are not integers are silently dropped.
pub fn parse_admin_ids(input: &str) -> Vec<i64> {
    input
        .split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_record_yields_defaults() {
        assert_eq!(Settings::merge_stored(None), Settings::default());
    }

    #[test]
    fn malformed_record_yields_defaults() {
        assert_eq!(Settings::merge_stored(Some("{not json")), Settings::default());
    }

    #[test]
    fn partial_record_keeps_stored_fields_and_defaults_the_rest() {
        let merged = Settings::merge_stored(Some(r#"{"start_hour":8,"posts_count":3}"#));
        assert_eq!(merged.start_hour, 8);
        assert_eq!(merged.posts_count, 3);
        assert_eq!(merged.end_hour, 21);
        assert_eq!(merged.slot_duration, 30);
        assert!(merged.additional_admin_ids.is_empty());
    }

    #[test]
    fn out_of_range_numerics_are_coerced() {
        let merged = Settings::merge_stored(Some(
            r#"{"start_hour":-2,"end_hour":25,"slot_duration":0,"posts_count":-1}"#,
        ));
        assert_eq!(merged.start_hour, 9);
        assert_eq!(merged.end_hour, 21);
        assert_eq!(merged.slot_duration, 30);
        // A stored-but-invalid bay count collapses to one bay; only a
        // missing field takes the two-bay default.
        assert_eq!(merged.posts_count, 1);
    }

    #[test]
    fn form_input_is_coerced_not_rejected() {
        let settings = Settings::from_form(
            "8",
            "not a number",
            "",
            "0",
            vec![1, 2],
            "token".to_string(),
            "@channel".to_string(),
        );
        assert_eq!(settings.start_hour, 8);
        assert_eq!(settings.end_hour, 21);
        assert_eq!(settings.slot_duration, 30);
        assert_eq!(settings.posts_count, 1);
        assert_eq!(settings.additional_admin_ids, vec![1, 2]);
        assert_eq!(settings.bot_token, "token");
    }

    #[test]
    fn admin_ids_parse_drops_non_numeric_entries() {
        assert_eq!(parse_admin_ids("12345, abc, 678 ,, 9"), vec![12345, 678, 9]);
        assert!(parse_admin_ids("").is_empty());
    }

    #[test]
    fn admin_check_covers_root_and_additional_lists() {
        let mut settings = Settings::default();
        assert!(settings.is_admin(ROOT_ADMIN_IDS[0]));
        assert!(!settings.is_admin(42));

        settings.additional_admin_ids.push(42);
        assert!(settings.is_admin(42));
    }
}
