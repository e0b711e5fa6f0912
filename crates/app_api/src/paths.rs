use std::path::PathBuf;

pub fn expand_home_path(path: &str) -> PathBuf {
    if path == "~"
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home);
    }
    if let Some(rest) = path.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home).join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_untouched() {
        assert_eq!(
            expand_home_path("/var/log/sessions"),
            PathBuf::from("/var/log/sessions")
        );
        assert_eq!(expand_home_path("~user/x"), PathBuf::from("~user/x"));
    }

    #[test]
    fn tilde_prefix_expands_to_home() {
        if let Ok(home) = std::env::var("HOME") {
            assert_eq!(
                expand_home_path("~/.codex/sessions"),
                PathBuf::from(home).join(".codex/sessions")
            );
        }
    }
}
