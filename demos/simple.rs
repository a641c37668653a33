use vmspec::model::{DataCenter, DiskTemplate, Package, Resources};
use vmspec::{decode, Format, VirtualMachineSpec};

fn main() {
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

    for format in [Format::Json, Format::Yaml, Format::Xml] {
        match spec.encode(format) {
            Ok(bytes) => println!("{format}:\n{}\n", String::from_utf8_lossy(&bytes)),
            Err(e) => eprintln!("Failed to encode {format}: {e:?}"),
        }
    }

    let markup = r#"<VirtualMachineSpec><Zone by="slug">north</Zone></VirtualMachineSpec>"#;
    match decode(markup.as_bytes(), Format::Xml) {
        Ok(spec) => println!("Decoded: {spec:?}"),
        Err(e) => eprintln!("Failed to decode markup: {:?}", miette::Report::new(e)),
    }
}
