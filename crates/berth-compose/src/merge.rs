//! Field-level merge of two raw service records.

use crate::value::RawService;

/// Prefixes identifying a build context as a remote source rather than a local path.
pub const VALID_REMOTES: &[&str] = &["git://", "git@github.com:", "github.com", "http:", "https:"];

/// Fields that may not be present on a service used as an extends base.
///
/// They point at other containers and cannot be re-targeted when the
/// service is composed into a new context.
pub const RESTRICTED_FIELDS: &[&str] = &["links", "volumes_from"];

/// Returns `true` if `context` names a remote build source.
pub fn is_remote_context(context: &str) -> bool {
    VALID_REMOTES.iter().any(|prefix| context.starts_with(prefix))
}

/// Merges `overrides` on top of `base`.
///
/// Every key of `overrides` replaces the same key of `base` wholesale;
/// nested sequences and mappings are never combined. Keys present on only
/// one side are carried through.
///
/// `image` and `build` exclude each other: an override that sets one drops
/// the other from the base, so a child choosing an image does not also
/// inherit its parent's build.
pub fn merge_service(base: RawService, overrides: RawService) -> RawService {
    let mut merged = base;

    if overrides.contains_key("image") {
        let _ = merged.remove("build");
        let _ = merged.remove("dockerfile");
    } else if overrides.contains_key("build") {
        let _ = merged.remove("image");
    }

    merged.extend(overrides);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::RawValue;

    fn record(pairs: &[(&str, RawValue)]) -> RawService {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn override_wins_on_shared_keys() {
        let base = record(&[("restart", "always".into()), ("user", "root".into())]);
        let over = record(&[("restart", "no".into())]);
        let merged = merge_service(base, over);
        assert_eq!(merged["restart"], RawValue::scalar("no"));
        assert_eq!(merged["user"], RawValue::scalar("root"));
    }

    #[test]
    fn one_sided_keys_are_carried_through() {
        let base = record(&[("user", "root".into())]);
        let over = record(&[("hostname", "web".into())]);
        let merged = merge_service(base, over);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["user"], RawValue::scalar("root"));
        assert_eq!(merged["hostname"], RawValue::scalar("web"));
    }

    #[test]
    fn lists_are_replaced_not_unioned() {
        let base = record(&[("ports", vec!["80".to_owned(), "443".to_owned()].into())]);
        let over = record(&[("ports", vec!["8080".to_owned()].into())]);
        let merged = merge_service(base, over);
        assert_eq!(merged["ports"], RawValue::from(vec!["8080".to_owned()]));
    }

    #[test]
    fn mappings_are_replaced_not_merged() {
        let mut base_env = std::collections::BTreeMap::new();
        let _ = base_env.insert("A".to_owned(), "1".to_owned());
        let mut over_env = std::collections::BTreeMap::new();
        let _ = over_env.insert("B".to_owned(), "2".to_owned());

        let merged = merge_service(
            record(&[("environment", base_env.into())]),
            record(&[("environment", over_env.clone().into())]),
        );
        assert_eq!(merged["environment"], RawValue::from(over_env));
    }

    #[test]
    fn image_override_drops_base_build() {
        let base = record(&[("build", ".".into()), ("dockerfile", "Dockerfile.dev".into())]);
        let over = record(&[("image", "foo".into())]);
        let merged = merge_service(base, over);
        assert!(!merged.contains_key("build"));
        assert!(!merged.contains_key("dockerfile"));
        assert_eq!(merged["image"], RawValue::scalar("foo"));
    }

    #[test]
    fn build_override_drops_base_image() {
        let base = record(&[("image", "foo".into())]);
        let over = record(&[("build", ".".into())]);
        let merged = merge_service(base, over);
        assert!(!merged.contains_key("image"));
        assert_eq!(merged["build"], RawValue::scalar("."));
    }

    #[test]
    fn remote_contexts_are_recognized() {
        assert!(is_remote_context("git://github.com/docker/compose"));
        assert!(is_remote_context("https://example.com/ctx.tar.gz"));
        assert!(is_remote_context("github.com/docker/compose"));
        assert!(!is_remote_context("./app"));
        assert!(!is_remote_context("/srv/app"));
    }
}
