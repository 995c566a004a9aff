fn main() -> Result<(), Box<dyn std::error::Error>> {
    for proto in ["common.proto", "groupuser.proto", "user.proto"] {
        println!("cargo:rerun-if-changed=proto/{}", proto);
    }

    let groupuser_fds = protox::compile(["proto/groupuser.proto"], ["proto"])?;
    let user_fds = protox::compile(["proto/user.proto"], ["proto"])?;

    // Build server for the GroupUser surface (this service provides)
    tonic_build::configure()
        .build_server(true)
        .build_client(false)
        .compile_fds(groupuser_fds)?;

    // Build client for the User service (to resolve usernames/uids)
    tonic_build::configure()
        .build_server(false)
        .build_client(true)
        .compile_fds(user_fds)?;

    Ok(())
}
