use std::path::PathBuf;

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

pub fn fixtures_root() -> PathBuf {
    workspace_root().join("fixtures")
}

pub fn scripts_root() -> PathBuf {
    fixtures_root().join("scripts")
}

/// `<fixtures>/scripts/<name>.json`.
pub fn fixture_path(name: &str) -> PathBuf {
    scripts_root().join(format!("{}.json", name))
}

pub fn roster_path() -> PathBuf {
    fixtures_root().join("roster.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_root_points_to_workspace() {
        assert!(workspace_root().join("Cargo.toml").exists());
    }

    #[test]
    fn scripts_root_points_to_fixture_scripts() {
        assert!(scripts_root().is_dir());
    }

    #[test]
    fn fixture_path_appends_json_extension() {
        let path = fixture_path("main");
        assert!(path.ends_with("main.json"));
        assert!(path.is_file());
    }

    #[test]
    fn roster_path_sits_beside_scripts() {
        assert!(roster_path().is_file());
    }
}
