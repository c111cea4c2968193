use protox::prost::Message;
use std::env::var;
use std::io::Result;

fn main() -> Result<()> {
    // List of proto files containing a message definition
    let proto_files = &[
        // Services
        "proto/hello.proto",
    ];

    // Name of the folder containing the proto definitions
    let proto_folder = "proto";
    let out_dir = var("OUT_DIR").expect("Missing OUT_DIR environment variable");
    let descriptors_path = format!("{}/descriptors.bin", out_dir);

    for file in proto_files {
        println!("cargo:rerun-if-changed={file}");
    }

    let file_descriptor_set = protox::compile(proto_files, [proto_folder]).unwrap();
    std::fs::write(descriptors_path, file_descriptor_set.encode_to_vec())?;

    // Only the message types are generated. Each one also derives `ReflectMessage`
    // against the pool decoded from `descriptors.bin`.
    let mut builder = tonic_prost_build::configure()
        .build_client(false)
        .build_server(false);

    for file in &file_descriptor_set.file {
        for message in &file.message_type {
            let full_name = format!("{}.{}", file.package(), message.name());
            builder = builder.message_attribute(
                format!(".{full_name}"),
                format!(
                    "#[derive(::prost_reflect::ReflectMessage)] \
                     #[prost_reflect(descriptor_pool = \"crate::DESCRIPTOR_POOL\", message_name = \"{full_name}\")]"
                ),
            );
        }
    }

    builder.compile_fds(file_descriptor_set)?;

    Ok(())
}
