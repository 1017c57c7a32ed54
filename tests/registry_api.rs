use assert_fs::TempDir;
use assert_fs::prelude::*;
use chrome_profile_launcher::filter::filter;
use chrome_profile_launcher::picker::{Focus, Picker};
use chrome_profile_launcher::registry::{Profile, ProfileRegistryReader};
use chrome_profile_launcher::test_support::write_local_state;

#[test]
fn reader_filter_and_picker_agree() -> color_eyre::Result<()> {
    let temp = TempDir::new()?;
    write_local_state(
        temp.path(),
        &[
            ("Profile 2", Some("alicia")),
            ("Default", Some("Alice")),
            ("Profile 1", Some("Bob")),
        ],
    )?;

    let loaded = ProfileRegistryReader::new(temp.path()).load()?;
    assert_eq!(loaded.root, temp.path());
    let filtered = filter(&loaded.profiles, "ali");
    assert_eq!(
        filtered,
        vec![
            Profile::new("Alice", "Default"),
            Profile::new("alicia", "Profile 2"),
        ]
    );

    let mut picker = Picker::new(loaded.profiles);
    picker.set_query("ali");
    assert_eq!(picker.visible(), filtered.as_slice());
    assert_eq!(picker.counts_line(), "Profiles: 3 | Filtered: 2");
    assert!(picker.confirm().is_none());

    picker.set_query("bo");
    assert_eq!(picker.focus(), Focus::Filter);
    assert_eq!(picker.confirm(), Some(&Profile::new("Bob", "Profile 1")));
    Ok(())
}

#[test]
fn registry_with_extra_sections_is_accepted() -> color_eyre::Result<()> {
    let temp = TempDir::new()?;
    temp.child("Local State").write_str(
        r#"{
            "browser": {"enabled_labs_experiments": []},
            "profile": {
                "info_cache": {
                    "Default": {"name": "Personal", "avatar_icon": "chrome://theme/IDR_PROFILE_AVATAR_26"},
                    "Profile 4": {"gaia_name": "Someone"}
                },
                "profiles_order": ["Default", "Profile 4"]
            }
        }"#,
    )?;

    let loaded = ProfileRegistryReader::new(temp.path()).load()?;
    assert_eq!(
        loaded.profiles,
        vec![
            Profile::new("Personal", "Default"),
            Profile::new("Profile 4", "Profile 4"),
        ]
    );
    Ok(())
}
