mod server;

pub use server::GroupUserGrpc;
