// src/cli/handlers/set.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{cli::handlers::commons, models::ProfileAttributes, state::AppState};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Creates or updates a profile from key=value pairs."
)]
struct SetArgs {
    /// The profile type.
    profile_type: String,

    /// The profile name.
    name: String,

    /// Attributes to set, as `key=value`.
    #[arg(required = true)]
    assignments: Vec<String>,

    /// Replace the profile instead of merging into the existing attributes.
    #[arg(long)]
    replace: bool,
}

/// Runs the command with its own arguments.
pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let set_args = SetArgs::try_parse_from(&args)?;

    let mut profile: ProfileAttributes = if set_args.replace {
        ProfileAttributes::new()
    } else {
        // Only a profile that does not exist yet starts empty; an unreadable one is an error.
        state
            .cache
            .load_existing(&set_args.profile_type, &set_args.name)?
            .map(|existing| existing.profile)
            .unwrap_or_default()
    };

    for raw in &set_args.assignments {
        let (key, value) = commons::parse_assignment(raw)?;
        log::debug!("Setting '{}' on profile '{}'", key, set_args.name);
        profile.insert(key, value);
    }

    state
        .cache
        .save_profile(profile, &set_args.name, &set_args.profile_type)?;
    state.refresh();

    println!(
        "{} {}",
        t!("common.success"),
        format_args!(
            t!("set.success.saved"),
            name = set_args.name.cyan(),
            profile_type = set_args.profile_type
        )
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{app_state, write_profile, write_type};
    use std::fs;
    use tempfile::tempdir;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merges_into_the_existing_profile() {
        let home = tempdir().unwrap();
        write_type(home.path(), "zosmf", Some("lpar1"));
        write_profile(home.path(), "zosmf", "lpar1", "host: old.example.com\nport: 1443\n");
        let mut state = app_state(home.path());

        handle(args(&["zosmf", "lpar1", "host=new.example.com"]), &mut state).unwrap();

        let lpar1 = state.cache.load_named_profile("lpar1", Some("zosmf")).unwrap();
        assert_eq!(lpar1.host(), Some("new.example.com"));
        assert_eq!(lpar1.port(), Some(1443));
    }

    #[test]
    fn test_unreadable_profile_is_left_untouched() {
        let home = tempdir().unwrap();
        write_type(home.path(), "zosmf", None);
        let original = "host: h.example.com\nport: 1443\nrejectUnauthorized: false\npassword: managed by @zowe/cli\n";
        write_profile(home.path(), "zosmf", "lpar1", original);
        let mut state = app_state(home.path());

        let result = handle(args(&["zosmf", "lpar1", "host=new.example.com"]), &mut state);

        assert!(result.is_err());
        let on_disk = fs::read_to_string(home.path().join("profiles/zosmf/lpar1.yaml")).unwrap();
        assert_eq!(on_disk, original);
    }

    #[test]
    fn test_missing_profile_is_created() {
        let home = tempdir().unwrap();
        write_type(home.path(), "zosmf", None);
        let mut state = app_state(home.path());

        handle(args(&["zosmf", "fresh", "host=fresh.example.com", "port=443"]), &mut state).unwrap();

        let fresh = state.cache.load_named_profile("fresh", Some("zosmf")).unwrap();
        assert_eq!(fresh.port(), Some(443));
        assert_eq!(
            state.cache.get_default_profile(None).map(|p| p.name.as_str()),
            Some("fresh")
        );
    }
}
