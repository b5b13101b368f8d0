fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/calculator/v1/calculator.proto");
    println!("cargo:rerun-if-changed=proto/grpc/health/v1/health.proto");
    println!("cargo:rerun-if-changed=proto");

    let descriptor_path =
        std::path::PathBuf::from(std::env::var("OUT_DIR")?).join("calculator_descriptor.bin");

    tonic_prost_build::configure()
        .file_descriptor_set_path(descriptor_path)
        .build_client(true)
        .build_server(true)
        .compile_protos(
            &[
                "proto/calculator/v1/calculator.proto",
                "proto/grpc/health/v1/health.proto",
            ],
            &["proto"],
        )?;

    Ok(())
}
