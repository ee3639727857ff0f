//! Layered settings loading through the `config` crate.

#[cfg(test)]
mod tests {
    use std::io::Write;

    use cinematic_pan::settings::{
        CinematicSettings, SettingsProvider, DEFAULT_BARS_COLOR, MAX_ANIMATION_DURATION_MS,
        MAX_BARS_HEIGHT_PCT,
    };
    use cinematic_pan::CinematicError;

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("cinematic-")
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn defaults_without_file() {
        let settings = CinematicSettings::load(None).unwrap();
        assert_eq!(settings.animation_duration, 3000);
        assert!(settings.show_notifications);
        assert_eq!(settings.cinematic_bars_height, 10);
        assert_eq!(settings.cinematic_bars_color, "#000000");
        assert_eq!(settings.cinematic_bars_opacity, 1.0);
        assert!(!settings.hide_ui_for_players);
        assert!(!settings.debug_mode);
        assert!(!settings.debug_mode());
    }

    #[test]
    fn file_values_override_defaults() {
        let file = toml_file(
            r##"
animation_duration = 1200
cinematic_bars_color = "#ff8800"
hide_ui_for_players = true
"##,
        );
        let settings = CinematicSettings::load(Some(file.path())).unwrap();

        assert_eq!(settings.animation_duration, 1200);
        assert_eq!(settings.cinematic_bars_color, "#ff8800");
        assert!(settings.hide_ui_for_players);
        // Untouched keys keep their defaults.
        assert_eq!(settings.cinematic_bars_height, 10);
        assert_eq!(settings.animation_duration_ms(), 1200);
        assert!(settings.hide_ui_for_players());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let file = toml_file(
            r#"
animation_duration = 20000
cinematic_bars_height = 90
cinematic_bars_opacity = 1.7
cinematic_bars_color = "blue"
"#,
        );
        let settings = CinematicSettings::load(Some(file.path())).unwrap();

        assert_eq!(settings.animation_duration, MAX_ANIMATION_DURATION_MS);
        assert_eq!(settings.cinematic_bars_height, MAX_BARS_HEIGHT_PCT);
        assert_eq!(settings.cinematic_bars_opacity, 1.0);
        assert_eq!(settings.cinematic_bars_color, DEFAULT_BARS_COLOR);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = CinematicSettings::load(Some(missing.as_path())).unwrap_err();
        assert!(matches!(err, CinematicError::Settings(_)));
    }

    #[test]
    fn wrong_type_is_an_error() {
        let file = toml_file("show_notifications = \"often\"\n");
        let err = CinematicSettings::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, CinematicError::Settings(_)));
    }
}
