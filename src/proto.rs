//! Generated protobuf/tonic bindings. The module tree mirrors the proto
//! package tree so that cross-package references resolve.

pub mod common {
    tonic::include_proto!("common");
}

pub mod groupuser {
    pub mod v1 {
        tonic::include_proto!("groupuser.v1");
    }
}

pub mod user {
    pub mod v1 {
        tonic::include_proto!("user.v1");
    }
}
