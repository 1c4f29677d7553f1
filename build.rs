// Compiles the gRPC service and message definitions at build time. The
// generated module is pulled into the crate by `tonic::include_proto!` in
// src/lib.rs.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_build::compile_protos("proto/mailinglist.proto")?;

    Ok(())
}
