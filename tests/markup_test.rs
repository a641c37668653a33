// Markup-format shape handling: header, hostname, display name, list
// wrappers, authorized keys and strict decoding.
use vmspec::error::{Error, ParseError, XmlParseError};
use vmspec::model::*;
use vmspec::xml::{self, HEADER};
use vmspec::VirtualMachineSpec;

fn encode(spec: &VirtualMachineSpec) -> String {
    String::from_utf8(spec.to_xml().unwrap()).unwrap()
}

fn decode(source: &str) -> VirtualMachineSpec {
    xml::from_str(source).unwrap_or_else(|err| panic!("Failed to decode {source}: {err}"))
}

fn decode_err(source: &str) -> Error {
    match xml::from_str(source) {
        Ok(spec) => panic!("Expected an error, got {spec:?}"),
        Err(err) => err,
    }
}

fn xml_error(err: &Error) -> &XmlParseError {
    match err {
        Error::Parse(ParseError::Xml(inner)) => inner,
        other => panic!("Expected an xml parse error, got {other:?}"),
    }
}

#[test]
fn test_end_to_end_example() {
    let spec = VirtualMachineSpec {
        data_center: Some(DataCenter {
            permalink: "london".into(),
            ..Default::default()
        }),
        resources: Some(Resources {
            package: Some(Package {
                permalink: "rock-3".into(),
                ..Default::default()
            }),
            ..Default::default()
        }),
        disk_template: Some(DiskTemplate {
            permalink: "templates/ubuntu-18-04".into(),
            ..Default::default()
        }),
        hostname: "web-3".into(),
        ..Default::default()
    };

    let expected = concat!(
        "<VirtualMachineSpec>",
        r#"<DataCenter by="permalink">london</DataCenter>"#,
        r#"<Resources><Package by="permalink">rock-3</Package></Resources>"#,
        r#"<DiskTemplate><DiskTemplate by="permalink">templates/ubuntu-18-04</DiskTemplate></DiskTemplate>"#,
        "<Hostname><Hostname>web-3</Hostname></Hostname>",
        "</VirtualMachineSpec>"
    );
    let encoded = encode(&spec);
    assert_eq!(encoded.strip_prefix(HEADER), Some(expected));
    assert_eq!(decode(&encoded), spec);
}

// ============================================================================
// Declaration header
// ============================================================================

#[test]
fn test_header_is_written() {
    let encoded = encode(&VirtualMachineSpec::default());
    assert_eq!(
        encoded,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<VirtualMachineSpec><Hostname><Random/></Hostname></VirtualMachineSpec>"
    );
}

#[test]
fn test_missing_header_is_accepted() {
    let spec = decode("<VirtualMachineSpec><Description>no header</Description></VirtualMachineSpec>");
    assert_eq!(spec.description, "no header");
}

#[test]
fn test_different_header_is_not_validated() {
    let spec = decode(
        "<?xml version=\"1.1\" encoding=\"ISO-8859-1\" standalone=\"yes\"?>\n<VirtualMachineSpec><Description>old</Description></VirtualMachineSpec>",
    );
    assert_eq!(spec.description, "old");
}

// ============================================================================
// Hostname
// ============================================================================

#[test]
fn test_empty_hostname_is_random_marker() {
    let encoded = encode(&VirtualMachineSpec::default());
    assert!(encoded.contains("<Hostname><Random/></Hostname>"));
}

#[test]
fn test_hostname_double_nesting() {
    let spec = VirtualMachineSpec {
        hostname: "db-1".into(),
        ..Default::default()
    };
    let encoded = encode(&spec);
    assert!(encoded.contains("<Hostname><Hostname>db-1</Hostname></Hostname>"));
    assert!(!encoded.contains("Random"));
}

#[test]
fn test_random_marker_decodes_to_empty() {
    for marker in ["<Random/>", "<Random></Random>"] {
        let spec = decode(&format!(
            "<VirtualMachineSpec><Hostname>{marker}</Hostname></VirtualMachineSpec>"
        ));
        assert_eq!(spec.hostname, "");
    }
}

#[test]
fn test_missing_hostname_decodes_to_empty() {
    let spec = decode("<VirtualMachineSpec></VirtualMachineSpec>");
    assert_eq!(spec, VirtualMachineSpec::default());
}

#[test]
fn test_flat_hostname_is_rejected() {
    let err = decode_err("<VirtualMachineSpec><Hostname>web-1</Hostname></VirtualMachineSpec>");
    assert!(matches!(
        xml_error(&err),
        XmlParseError::UnexpectedText { element } if element == "Hostname"
    ));
}

// ============================================================================
// Display name
// ============================================================================

#[test]
fn test_name_both_shapes_normalize() {
    let flat = decode("<VirtualMachineSpec><Name>Web Server</Name></VirtualMachineSpec>");
    let nested =
        decode("<VirtualMachineSpec><Name><Name>Web Server</Name></Name></VirtualMachineSpec>");
    assert_eq!(flat.name, "Web Server");
    assert_eq!(flat, nested);
}

#[test]
fn test_name_encodes_flat() {
    let spec = decode("<VirtualMachineSpec><Name><Name>Web Server</Name></Name></VirtualMachineSpec>");
    let encoded = encode(&spec);
    assert!(encoded.contains("<Name>Web Server</Name>"));
    assert!(!encoded.contains("<Name><Name>"));
}

#[test]
fn test_name_rejects_other_nesting() {
    let err = decode_err("<VirtualMachineSpec><Name><Title>x</Title></Name></VirtualMachineSpec>");
    assert!(matches!(
        xml_error(&err),
        XmlParseError::UnknownElement { parent, element } if parent == "Name" && element == "Title"
    ));
}

// ============================================================================
// List wrappers
// ============================================================================

#[test]
fn test_empty_lists_have_no_wrapper() {
    let spec = VirtualMachineSpec {
        hostname: "web-1".into(),
        system_disks: vec![],
        tags: vec![],
        ..Default::default()
    };
    let encoded = encode(&spec);
    for wrapper in [
        "SystemDisks",
        "SharedDisks",
        "NetworkInterfaces",
        "BackupPolicies",
        "Tags",
    ] {
        assert!(!encoded.contains(wrapper), "{wrapper} in {encoded}");
    }
}

#[test]
fn test_empty_wrapper_decodes_to_empty_list() {
    let spec = decode("<VirtualMachineSpec><Tags></Tags><SharedDisks/></VirtualMachineSpec>");
    assert!(spec.tags.is_empty());
    assert!(spec.shared_disks.is_empty());
    assert!(!encode(&spec).contains("Tags"));
}

#[test]
fn test_wrapped_items() {
    let spec = VirtualMachineSpec {
        tags: vec!["web".into(), "production".into()],
        shared_disks: vec![
            SharedDisk {
                id: "disk_1".into(),
                ..Default::default()
            },
            SharedDisk {
                name: "media".into(),
                ..Default::default()
            },
        ],
        ..Default::default()
    };
    let encoded = encode(&spec);
    assert!(encoded.contains(r#"<SharedDisks><Disk>disk_1</Disk><Disk by="name">media</Disk></SharedDisks>"#));
    assert!(encoded.contains("<Tags><Tag>web</Tag><Tag>production</Tag></Tags>"));
    assert_eq!(decode(&encoded), spec);
}

#[test]
fn test_wrong_item_in_wrapper() {
    let err = decode_err("<VirtualMachineSpec><Tags><Label>x</Label></Tags></VirtualMachineSpec>");
    assert!(matches!(
        xml_error(&err),
        XmlParseError::UnknownElement { parent, element } if parent == "Tags" && element == "Label"
    ));
}

// ============================================================================
// Authorized keys
// ============================================================================

#[test]
fn test_all_flag_drops_explicit_list() {
    let spec = VirtualMachineSpec {
        authorized_keys: Some(AuthorizedKeys {
            all_users: true,
            users: vec![
                User {
                    id: "user_1".into(),
                    ..Default::default()
                },
                User {
                    email_address: "jane@example.com".into(),
                    ..Default::default()
                },
            ],
            all_ssh_keys: false,
            ssh_keys: vec![SshKey { id: "key_1".into() }],
        }),
        ..Default::default()
    };

    let encoded = encode(&spec);
    assert!(encoded.contains(
        r#"<AuthorizedKeys><Users all="yes"/><SSHKeys><SSHKey>key_1</SSHKey></SSHKeys></AuthorizedKeys>"#
    ));

    let keys = decode(&encoded).authorized_keys.unwrap();
    assert!(keys.all_users);
    assert!(keys.users.is_empty());
    assert!(!keys.all_ssh_keys);
    assert_eq!(keys.ssh_keys, vec![SshKey { id: "key_1".into() }]);
}

#[test]
fn test_all_flag_spellings() {
    for (value, expected) in [("yes", true), ("true", true), ("1", true), ("no", false), ("false", false)] {
        let spec = decode(&format!(
            r#"<VirtualMachineSpec><AuthorizedKeys><SSHKeys all="{value}"/></AuthorizedKeys></VirtualMachineSpec>"#
        ));
        assert_eq!(spec.authorized_keys.unwrap().all_ssh_keys, expected, "{value}");
    }

    let err = decode_err(
        r#"<VirtualMachineSpec><AuthorizedKeys><Users all="maybe"/></AuthorizedKeys></VirtualMachineSpec>"#,
    );
    assert!(matches!(xml_error(&err), XmlParseError::InvalidValue { .. }));
}

#[test]
fn test_decode_keeps_flag_and_list() {
    // Only encoding applies precedence; decoding takes the document as written.
    let spec = decode(
        r#"<VirtualMachineSpec><AuthorizedKeys><Users all="yes"><User>user_1</User></Users></AuthorizedKeys></VirtualMachineSpec>"#,
    );
    let keys = spec.authorized_keys.unwrap();
    assert!(keys.all_users);
    assert_eq!(keys.users.len(), 1);
}

// ============================================================================
// Disk template
// ============================================================================

#[test]
fn test_disk_template_version_and_options() {
    let source = format!(
        "{HEADER}<VirtualMachineSpec><DiskTemplate><DiskTemplate by=\"permalink\">templates/debian-12</DiskTemplate><Version>4</Version><Option key=\"locale\">en_GB</Option><Option key=\"timezone\">Europe/London</Option></DiskTemplate><Hostname><Random/></Hostname></VirtualMachineSpec>"
    );
    let spec = decode(&source);
    let template = spec.disk_template.clone().unwrap();
    assert_eq!(template.permalink, "templates/debian-12");
    assert_eq!(template.version, 4);
    assert_eq!(template.options.len(), 2);
    assert_eq!(template.options[1].value, "Europe/London");
    assert_eq!(encode(&spec), source);
}

#[test]
fn test_disk_template_flat_selector_rejected() {
    let err = decode_err(
        r#"<VirtualMachineSpec><DiskTemplate by="permalink">templates/debian-12</DiskTemplate></VirtualMachineSpec>"#,
    );
    assert!(matches!(
        xml_error(&err),
        XmlParseError::UnknownAttribute { element, attribute } if element == "DiskTemplate" && attribute == "by"
    ));
}

// ============================================================================
// Strict decoding
// ============================================================================

#[test]
fn test_unknown_element_rejected() {
    let err = decode_err("<VirtualMachineSpec><Flavour>large</Flavour></VirtualMachineSpec>");
    assert!(err.is_xml_parse_error());
    assert_eq!(
        err.to_string(),
        "parse error: xml: unknown element <Flavour> in <VirtualMachineSpec>"
    );
}

#[test]
fn test_unknown_nested_element_rejected() {
    let err = decode_err(
        "<VirtualMachineSpec><Resources><Memory>4</Memory><GPUs>1</GPUs></Resources></VirtualMachineSpec>",
    );
    assert!(matches!(
        xml_error(&err),
        XmlParseError::UnknownElement { parent, element } if parent == "Resources" && element == "GPUs"
    ));
}

#[test]
fn test_unknown_attribute_rejected() {
    let err = decode_err(r#"<VirtualMachineSpec><Zone by="name" region="eu">North</Zone></VirtualMachineSpec>"#);
    assert!(matches!(
        xml_error(&err),
        XmlParseError::UnknownAttribute { element, attribute } if element == "Zone" && attribute == "region"
    ));

    let err = decode_err(r#"<VirtualMachineSpec version="2"></VirtualMachineSpec>"#);
    assert!(matches!(xml_error(&err), XmlParseError::UnknownAttribute { .. }));
}

#[test]
fn test_wrong_root_rejected() {
    let err = decode_err("<VirtualMachine></VirtualMachine>");
    assert!(matches!(
        xml_error(&err),
        XmlParseError::UnknownElement { element, .. } if element == "VirtualMachine"
    ));
}

#[test]
fn test_invalid_number() {
    let err = decode_err(
        "<VirtualMachineSpec><Resources><Memory>lots</Memory></Resources></VirtualMachineSpec>",
    );
    assert_eq!(
        err.to_string(),
        r#"parse error: xml: invalid value "lots" in <Memory>, expected a non-negative integer"#
    );
}

#[test]
fn test_invalid_keyword() {
    let err = decode_err(
        "<VirtualMachineSpec><BackupPolicies><BackupPolicy><Schedule><Interval>fortnightly</Interval></Schedule></BackupPolicy></BackupPolicies></VirtualMachineSpec>",
    );
    assert_eq!(
        err.to_string(),
        r#"parse error: xml: invalid value "fortnightly" in <Interval>, expected one of hourly, daily, weekly, monthly, yearly"#
    );
}

#[test]
fn test_truncated_document() {
    let err = decode_err("<VirtualMachineSpec><Zone>zone_1</Zone>");
    assert!(err.is_parse_error());
    assert!(err.is_xml_parse_error());
    assert!(err.unsupported_selector().is_none());
}

#[test]
fn test_escaped_content() {
    let spec = VirtualMachineSpec {
        description: "CPU < 4 & RAM > 2".into(),
        ..Default::default()
    };
    let encoded = encode(&spec);
    assert!(encoded.contains("<Description>CPU &lt; 4 &amp; RAM &gt; 2</Description>"));
    assert_eq!(decode(&encoded), spec);
}
