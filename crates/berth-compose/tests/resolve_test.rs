//! Integration tests for compose document resolution.
//!
//! These tests drive the public entry points end to end:
//! 1. Version dispatch (legacy and structured documents)
//! 2. Local and cross-file `extends`
//! 3. Interpolation with an injected environment
//! 4. Validation failures
//! 5. Layering several documents

#![allow(clippy::expect_used, clippy::unwrap_used)]

use berth_compose::{
    ComposeError, Configs, FileResourceLookup, MapEnvironment, Project, Resolved, Warning, resolve,
};
use rstest::rstest;

fn resolve_plain(text: &str) -> Resolved {
    resolve(&Configs::new(), None, None, "docker-compose.yml", text.as_bytes())
        .expect("document should resolve")
}

// ── Version dispatch ─────────────────────────────────────────────────

const INHERIT_IMAGE_V1: &str = "
parent:
  image: foo
child:
  extends:
    service: parent
";

const INHERIT_IMAGE_V2: &str = "
version: '2'
services:
  parent:
    image: foo
  child:
    extends:
      service: parent
";

#[rstest]
#[case::legacy(INHERIT_IMAGE_V1)]
#[case::structured(INHERIT_IMAGE_V2)]
fn extends_inherits_image(#[case] text: &str) {
    let resolved = resolve_plain(text);
    let parent = resolved.services.get("parent").expect("parent");
    let child = resolved.services.get("child").expect("child");

    assert_eq!(parent.image.as_deref(), Some("foo"));
    assert_eq!(child.image.as_deref(), Some("foo"));
    assert_eq!(child.build_context(), "");
}

#[rstest]
#[case::legacy("parent:\n  build: .\nchild:\n  extends:\n    service: parent\n")]
#[case::structured(
    "version: '2'\nservices:\n  parent:\n    build:\n      context: .\n  child:\n    extends:\n      service: parent\n"
)]
fn extends_inherits_build(#[case] text: &str) {
    let resolved = resolve_plain(text);
    let parent = resolved.services.get("parent").expect("parent");
    let child = resolved.services.get("child").expect("child");

    assert_eq!(parent.build_context(), ".");
    assert_eq!(child.build_context(), ".");
    assert!(child.image.is_none());
}

#[rstest]
#[case::legacy("parent:\n  image: foo\nchild:\n  build: .\n  extends:\n    service: parent\n")]
#[case::structured(
    "version: '2'\nservices:\n  parent:\n    image: foo\n  child:\n    build:\n      context: .\n    extends:\n      service: parent\n"
)]
fn extends_build_over_image(#[case] text: &str) {
    let resolved = resolve_plain(text);
    let parent = resolved.services.get("parent").expect("parent");
    let child = resolved.services.get("child").expect("child");

    assert_eq!(parent.image.as_deref(), Some("foo"));
    assert_eq!(child.build_context(), ".");
    assert!(child.image.is_none());
}

#[rstest]
#[case::legacy("parent:\n  build: .\nchild:\n  image: foo\n  extends:\n    service: parent\n")]
#[case::structured(
    "version: '2'\nservices:\n  parent:\n    build:\n      context: .\n  child:\n    image: foo\n    extends:\n      service: parent\n"
)]
fn extends_image_over_build(#[case] text: &str) {
    let resolved = resolve_plain(text);
    let parent = resolved.services.get("parent").expect("parent");
    let child = resolved.services.get("child").expect("child");

    assert!(parent.image.is_none());
    assert_eq!(parent.build_context(), ".");
    assert_eq!(child.image.as_deref(), Some("foo"));
    assert_eq!(child.build_context(), "");
}

#[rstest]
#[case::legacy_quoted_no("test:\n  restart: \"no\"\n  image: foo\n", "no")]
#[case::structured_quoted_no("version: '2'\nservices:\n  test:\n    restart: \"no\"\n    image: foo\n", "no")]
#[case::legacy_bare_no("test:\n  restart: no\n  image: foo\n", "no")]
#[case::legacy_always("test:\n  restart: always\n  image: foo\n", "always")]
#[case::structured_always("version: '2'\nservices:\n  test:\n    restart: always\n    image: foo\n", "always")]
fn restart_policy_is_kept_verbatim(#[case] text: &str, #[case] expected: &str) {
    let resolved = resolve_plain(text);
    let test = resolved.services.get("test").expect("test");
    assert_eq!(test.restart.as_deref(), Some(expected));
}

#[test]
fn legacy_and_structured_converge() {
    let legacy = resolve_plain(INHERIT_IMAGE_V1);
    let structured = resolve_plain(INHERIT_IMAGE_V2);
    assert_eq!(legacy.services, structured.services);
}

#[test]
fn legacy_options_upgrade_to_structured_equivalents() {
    let legacy = resolve_plain(
        "web:\n  build: ./app\n  dockerfile: Dockerfile.dev\n  log_driver: syslog\n  log_opt:\n    tag: web\n  net: host\n",
    );
    let structured = resolve_plain(
        "version: '2'\nservices:\n  web:\n    build:\n      context: ./app\n      dockerfile: Dockerfile.dev\n    logging:\n      driver: syslog\n      options:\n        tag: web\n    network_mode: host\n",
    );
    assert_eq!(legacy.services, structured.services);
}

// ── Extends ──────────────────────────────────────────────────────────

#[test]
fn extends_chain_resolves_through_every_level() {
    let resolved = resolve_plain(
        "a:\n  image: a\n  user: a\n  hostname: a\nb:\n  user: b\n  extends:\n    service: a\nc:\n  hostname: c\n  extends:\n    service: b\n",
    );
    let c = resolved.services.get("c").expect("c");
    assert_eq!(c.image.as_deref(), Some("a"));
    assert_eq!(c.user.as_deref(), Some("b"));
    assert_eq!(c.hostname.as_deref(), Some("c"));
}

#[rstest]
#[case::links("links:\n    - db")]
#[case::volumes_from("volumes_from:\n    - data")]
fn extending_relational_base_fails(#[case] field: &str) {
    let text = format!(
        "db:\n  image: postgres\ndata:\n  image: busybox\nparent:\n  image: foo\n  {field}\nchild:\n  extends:\n    service: parent\n"
    );
    let err = resolve(&Configs::new(), None, None, "docker-compose.yml", text.as_bytes())
        .unwrap_err();
    assert!(
        matches!(err, ComposeError::ExtendRestrictedField { ref service, .. } if service == "parent"),
        "got: {err}"
    );
}

#[test]
fn circular_extends_fails() {
    let err = resolve(
        &Configs::new(),
        None,
        None,
        "docker-compose.yml",
        b"a:\n  image: x\n  extends:\n    service: b\nb:\n  extends:\n    service: a\n",
    )
    .unwrap_err();
    assert!(matches!(err, ComposeError::ExtendCycle { .. }), "got: {err}");
}

#[test]
fn cross_file_extends_without_lookup_fails() {
    let err = resolve(
        &Configs::new(),
        None,
        None,
        "docker-compose.yml",
        b"web:\n  extends:\n    file: common.yml\n    service: base\n",
    )
    .unwrap_err();
    assert!(matches!(err, ComposeError::ExtendsUnsupported { .. }), "got: {err}");
}

#[test]
fn cross_file_extends_reads_sibling_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("common.yml"),
        "base:\n  build: ./app\n  environment:\n    - MODE=${MODE}\n  cpu_shares: 512\n",
    )
    .expect("write common");
    let main = dir.path().join("docker-compose.yml");
    std::fs::write(
        &main,
        "web:\n  cpu_shares: 1024\n  extends:\n    file: common.yml\n    service: base\n",
    )
    .expect("write main");

    let env = MapEnvironment::new().with("MODE", "prod");
    let resolved = resolve(
        &Configs::new(),
        Some(&env),
        Some(&FileResourceLookup),
        &main.to_string_lossy(),
        &std::fs::read(&main).expect("read main"),
    )
    .expect("resolve");

    let web = resolved.services.get("web").expect("web");
    assert_eq!(web.cpu_shares, Some(1024));
    assert_eq!(web.environment["MODE"], "prod");
    assert_eq!(
        web.build_context(),
        dir.path().join("app").to_string_lossy()
    );
}

#[test]
fn cross_file_missing_file_is_a_lookup_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let main = dir.path().join("docker-compose.yml");
    let err = resolve(
        &Configs::new(),
        None,
        Some(&FileResourceLookup),
        &main.to_string_lossy(),
        b"web:\n  extends:\n    file: absent.yml\n    service: base\n",
    )
    .unwrap_err();
    assert!(matches!(err, ComposeError::Lookup { .. }), "got: {err}");
}

#[test]
fn cross_file_base_with_invalid_value_is_reported_under_its_own_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("common.yml"),
        "base:\n  image: busybox\n  ports: invalid_type\n",
    )
    .expect("write common");
    let main = dir.path().join("docker-compose.yml");
    let err = resolve(
        &Configs::new(),
        None,
        Some(&FileResourceLookup),
        &main.to_string_lossy(),
        b"test:\n  extends:\n    file: common.yml\n    service: base\n",
    )
    .unwrap_err();
    assert!(
        matches!(err, ComposeError::InvalidFieldType { ref service, ref field, .. }
            if service == "base" && field == "ports"),
        "got: {err}"
    );
}

// ── Interpolation ────────────────────────────────────────────────────

const FLANNEL: &str = "flannel:\n  image: quay.io/coreos/flannel\n  command: exec /opt/bin/flanneld -iface=${NODE_IP}\n";

#[test]
fn unset_variable_substitutes_blank_and_warns() {
    let env = MapEnvironment::new();
    let resolved = resolve(&Configs::new(), Some(&env), None, "f.yml", FLANNEL.as_bytes())
        .expect("resolve");

    let flannel = resolved.services.get("flannel").expect("flannel");
    assert_eq!(flannel.command, vec!["exec", "/opt/bin/flanneld", "-iface="]);
    assert_eq!(
        resolved.warnings,
        vec![Warning::UnsetVariable {
            service: "flannel".into(),
            option: "command".into(),
            variable: "NODE_IP".into(),
        }]
    );
}

#[test]
fn set_variable_is_substituted() {
    let env = MapEnvironment::new().with("NODE_IP", "10.0.0.1");
    let resolved = resolve(&Configs::new(), Some(&env), None, "f.yml", FLANNEL.as_bytes())
        .expect("resolve");

    let flannel = resolved.services.get("flannel").expect("flannel");
    assert_eq!(flannel.command, vec!["exec", "/opt/bin/flanneld", "-iface=10.0.0.1"]);
    assert!(resolved.warnings.is_empty());
}

#[test]
fn invalid_interpolation_names_option_and_service() {
    let env = MapEnvironment::new();
    let err = resolve(
        &Configs::new(),
        Some(&env),
        None,
        "f.yml",
        b"web:\n  image: \"${IMAGE\"\n",
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid interpolation format for \"image\" option in service \"web\": \"${IMAGE\""
    );
}

// ── Validation ───────────────────────────────────────────────────────

#[test]
fn unknown_option_is_rejected() {
    let err = resolve(
        &Configs::new(),
        None,
        None,
        "f.yml",
        b"foo:\n  image: busybox\n  privilege: something\n",
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "unsupported config option for foo service: 'privilege'");
}

#[test]
fn wrong_shape_is_rejected() {
    let err = resolve(&Configs::new(), None, None, "f.yml", b"test:\n  image: busybox\n  ports: invalid_type\n")
        .unwrap_err();
    assert!(matches!(err, ComposeError::InvalidFieldType { ref field, .. } if field == "ports"), "got: {err}");
}

#[test]
fn unknown_option_on_local_base_names_the_base() {
    let err = resolve(
        &Configs::new(),
        None,
        None,
        "f.yml",
        b"app:\n  extends:\n    service: zbase\nzbase:\n  image: busybox\n  privilege: something\n",
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "unsupported config option for zbase service: 'privilege'");
}

#[test]
fn block_io_throttles_are_accepted() {
    let resolved = resolve_plain(
        "web:\n  image: busybox\n  device_read_bps:\n    - /dev/sda:100000\n  blkio_weight_device:\n    - /dev/sda:10\n",
    );
    let web = resolved.services.get("web").expect("web");
    assert_eq!(web.device_read_bps, vec!["/dev/sda:100000"]);
    assert_eq!(web.blkio_weight_device, vec!["/dev/sda:10"]);
}

#[test]
fn duplicate_devices_are_rejected() {
    let err = resolve(
        &Configs::new(),
        None,
        None,
        "f.yml",
        b"test:\n  image: busybox\n  devices:\n    - /dev/foo:/dev/foo\n    - /dev/foo:/dev/foo\n",
    )
    .unwrap_err();
    assert!(matches!(err, ComposeError::NonUniqueEntries { ref field, .. } if field == "devices"), "got: {err}");
}

#[test]
fn malformed_document_is_a_decode_error() {
    let err = resolve(&Configs::new(), None, None, "f.yml", b"web: [unclosed\n").unwrap_err();
    assert!(matches!(err, ComposeError::Decode { .. }), "got: {err}");
}

#[test]
fn unknown_network_option_is_rejected() {
    let err = resolve(
        &Configs::new(),
        None,
        None,
        "f.yml",
        b"version: '2'\nservices: {}\nnetworks:\n  front:\n    drivr: bridge\n",
    )
    .unwrap_err();
    assert!(matches!(err, ComposeError::UnsupportedResourceField { kind: "network", .. }), "got: {err}");
}

// ── Layering ─────────────────────────────────────────────────────────

#[test]
fn last_applied_file_wins() {
    let first = resolve_plain("multiple:\n  image: tianon/true\n  user: root\n");
    let second = resolve(
        &first.services,
        None,
        None,
        "docker-compose.override.yml",
        b"multiple:\n  image: busybox\n",
    )
    .expect("resolve second");

    let multiple = second.services.get("multiple").expect("multiple");
    assert_eq!(multiple.image.as_deref(), Some("busybox"));
    assert_eq!(multiple.user.as_deref(), Some("root"));
}

#[test]
fn structured_overlay_on_legacy_base() {
    let first = resolve_plain("web:\n  build: .\n  dockerfile: Dockerfile.dev\n");
    let second = resolve(
        &first.services,
        None,
        None,
        "override.yml",
        b"version: '2'\nservices:\n  web:\n    image: web:latest\n",
    )
    .expect("resolve second");

    let web = second.services.get("web").expect("web");
    assert_eq!(web.image.as_deref(), Some("web:latest"));
    assert!(web.build.is_none());
}

#[test]
fn project_layers_files_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let main = dir.path().join("docker-compose.yml");
    let over = dir.path().join("docker-compose.override.yml");
    std::fs::write(&main, "web:\n  image: nginx\n  ports:\n    - 80\n").expect("write main");
    std::fs::write(&over, "version: '2'\nservices:\n  web:\n    ports:\n      - 8080\nnetworks:\n  front:\n").expect("write override");

    let mut project = Project::new("demo").with_resources(FileResourceLookup);
    project.add_file(&main).expect("main");
    project.add_file(&over).expect("override");

    let web = project.services().get("web").expect("web");
    assert_eq!(web.image.as_deref(), Some("nginx"));
    assert_eq!(web.ports, vec!["8080"]);
    assert!(project.model().networks.contains_key("front"));
}
