use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::{error, warn};

use crate::domain::GroupRole;
use crate::error::{ServiceError, ServiceResult, CODE_OK};
use crate::proto::common;
use crate::proto::groupuser::v1::group_user_server::GroupUser;
use crate::proto::groupuser::v1::*;
use crate::service::GroupService;

/// RPC façade over the policy engine. Handlers validate request shape,
/// delegate, and fold the outcome into the `Result{code, msg}` envelope;
/// application failures never surface as transport-level errors.
pub struct GroupUserGrpc {
    service: Arc<GroupService>,
}

impl GroupUserGrpc {
    pub fn new(service: Arc<GroupService>) -> Self {
        Self { service }
    }
}

fn ok() -> common::Result {
    common::Result {
        code: CODE_OK,
        msg: String::new(),
    }
}

fn failure(err: &ServiceError) -> common::Result {
    common::Result {
        code: err.code(),
        msg: err.to_string(),
    }
}

fn envelope(method: &'static str, outcome: &ServiceResult<()>) -> common::Result {
    match outcome {
        Ok(()) => ok(),
        Err(err) => {
            log_failure(method, err);
            failure(err)
        }
    }
}

fn log_failure(method: &'static str, err: &ServiceError) {
    if err.is_infrastructure() {
        error!(method, error = %err, "request failed");
    } else {
        warn!(method, error = %err, "request rejected");
    }
}

fn require_group_id(group_id: u64) -> ServiceResult<()> {
    if group_id == 0 {
        return Err(ServiceError::BadArgument("group_id is required".to_string()));
    }
    Ok(())
}

fn require_uid(uid: u64) -> ServiceResult<()> {
    if uid == 0 {
        return Err(ServiceError::BadArgument("uid is required".to_string()));
    }
    Ok(())
}

fn require_non_empty(field: &'static str, value: &str) -> ServiceResult<()> {
    if value.is_empty() {
        return Err(ServiceError::BadArgument(format!("{field} is required")));
    }
    Ok(())
}

fn member_type_from_role(role: GroupRole) -> MemberType {
    match role {
        GroupRole::Member => MemberType::Member,
        GroupRole::Manager => MemberType::Manager,
        GroupRole::Owner => MemberType::Owner,
    }
}

fn role_from_member_type(member_type: MemberType) -> GroupRole {
    match member_type {
        MemberType::Member => GroupRole::Member,
        MemberType::Manager => GroupRole::Manager,
        MemberType::Owner => GroupRole::Owner,
    }
}

#[tonic::async_trait]
impl GroupUser for GroupUserGrpc {
    async fn ping(&self, _request: Request<PingRequest>) -> Result<Response<Pong>, Status> {
        Ok(Response::new(Pong {}))
    }

    async fn create_group(
        &self,
        request: Request<CreateGroupRequest>,
    ) -> Result<Response<CreateGroupResponse>, Status> {
        let req = request.into_inner();

        let outcome = async {
            require_non_empty("name", &req.name)?;
            require_uid(req.uid)?;
            self.service.create_group(&req.name, req.uid).await
        }
        .await;

        let response = match outcome {
            Ok(group_id) => CreateGroupResponse {
                result: Some(ok()),
                group_id,
            },
            Err(err) => {
                log_failure("CreateGroup", &err);
                CreateGroupResponse {
                    result: Some(failure(&err)),
                    group_id: 0,
                }
            }
        };
        Ok(Response::new(response))
    }

    async fn get_group_public_info(
        &self,
        request: Request<GetGroupPublicInfoRequest>,
    ) -> Result<Response<GetGroupPublicInfoResponse>, Status> {
        let req = request.into_inner();

        let outcome = async {
            require_group_id(req.group_id)?;
            self.service.public_info(req.group_id).await
        }
        .await;

        let response = match outcome {
            Ok(group) => GetGroupPublicInfoResponse {
                result: Some(ok()),
                name: group.name,
            },
            Err(err) => {
                log_failure("GetGroupPublicInfo", &err);
                GetGroupPublicInfoResponse {
                    result: Some(failure(&err)),
                    name: String::new(),
                }
            }
        };
        Ok(Response::new(response))
    }

    async fn get_group_info(
        &self,
        request: Request<GetGroupInfoRequest>,
    ) -> Result<Response<GetGroupInfoResponse>, Status> {
        let req = request.into_inner();

        let outcome = async {
            require_group_id(req.group_id)?;
            require_uid(req.uid)?;
            self.service.group_info(req.group_id, req.uid).await
        }
        .await;

        let response = match outcome {
            Ok(roster) => GetGroupInfoResponse {
                result: Some(ok()),
                members: roster
                    .into_iter()
                    .map(|entry| GroupMember {
                        name: entry.name,
                        r#type: member_type_from_role(entry.role) as i32,
                    })
                    .collect(),
            },
            Err(err) => {
                log_failure("GetGroupInfo", &err);
                GetGroupInfoResponse {
                    result: Some(failure(&err)),
                    members: Vec::new(),
                }
            }
        };
        Ok(Response::new(response))
    }

    async fn join_group(
        &self,
        request: Request<JoinGroupRequest>,
    ) -> Result<Response<JoinGroupResponse>, Status> {
        let req = request.into_inner();

        let outcome = async {
            require_group_id(req.group_id)?;
            require_uid(req.uid)?;
            self.service
                .join_group(req.group_id, &req.password, req.uid)
                .await
        }
        .await;

        Ok(Response::new(JoinGroupResponse {
            result: Some(envelope("JoinGroup", &outcome)),
        }))
    }

    async fn invite_group(
        &self,
        request: Request<InviteGroupRequest>,
    ) -> Result<Response<InviteGroupResponse>, Status> {
        let req = request.into_inner();

        let outcome = async {
            require_group_id(req.group_id)?;
            require_uid(req.uid)?;
            require_non_empty("username", &req.username)?;
            self.service
                .invite(req.group_id, req.uid, &req.username)
                .await
        }
        .await;

        Ok(Response::new(InviteGroupResponse {
            result: Some(envelope("InviteGroup", &outcome)),
        }))
    }

    async fn kick_user(
        &self,
        request: Request<KickUserRequest>,
    ) -> Result<Response<KickUserResponse>, Status> {
        let req = request.into_inner();

        let outcome = async {
            require_group_id(req.group_id)?;
            require_uid(req.uid)?;
            require_non_empty("username", &req.username)?;
            self.service.kick(req.group_id, req.uid, &req.username).await
        }
        .await;

        Ok(Response::new(KickUserResponse {
            result: Some(envelope("KickUser", &outcome)),
        }))
    }

    async fn change_group_name(
        &self,
        request: Request<ChangeGroupNameRequest>,
    ) -> Result<Response<ChangeGroupNameResponse>, Status> {
        let req = request.into_inner();

        let outcome = async {
            require_group_id(req.group_id)?;
            require_uid(req.uid)?;
            require_non_empty("name", &req.name)?;
            self.service
                .change_name(req.group_id, req.uid, &req.name)
                .await
        }
        .await;

        Ok(Response::new(ChangeGroupNameResponse {
            result: Some(envelope("ChangeGroupName", &outcome)),
        }))
    }

    async fn change_group_password(
        &self,
        request: Request<ChangeGroupPasswordRequest>,
    ) -> Result<Response<ChangeGroupPasswordResponse>, Status> {
        let req = request.into_inner();

        // An empty password is legal here: it reopens the group.
        let outcome = async {
            require_group_id(req.group_id)?;
            require_uid(req.uid)?;
            self.service
                .change_password(req.group_id, req.uid, &req.password)
                .await
        }
        .await;

        Ok(Response::new(ChangeGroupPasswordResponse {
            result: Some(envelope("ChangeGroupPassword", &outcome)),
        }))
    }

    async fn set_user_type(
        &self,
        request: Request<SetUserTypeRequest>,
    ) -> Result<Response<SetUserTypeResponse>, Status> {
        let req = request.into_inner();

        let outcome = async {
            require_group_id(req.group_id)?;
            require_uid(req.uid)?;
            require_non_empty("username", &req.username)?;
            let member_type = MemberType::try_from(req.r#type).map_err(|_| {
                ServiceError::BadArgument(format!("unknown member type {}", req.r#type))
            })?;
            self.service
                .set_user_type(
                    req.group_id,
                    req.uid,
                    &req.username,
                    role_from_member_type(member_type),
                )
                .await
        }
        .await;

        Ok(Response::new(SetUserTypeResponse {
            result: Some(envelope("SetUserType", &outcome)),
        }))
    }

    async fn get_groups_by_uid(
        &self,
        request: Request<GetGroupsByUidRequest>,
    ) -> Result<Response<GetGroupsByUidResponse>, Status> {
        let req = request.into_inner();

        let outcome = async {
            require_uid(req.uid)?;
            self.service.groups_by_uid(req.uid).await
        }
        .await;

        let response = match outcome {
            Ok(groups) => GetGroupsByUidResponse {
                result: Some(ok()),
                groups: groups
                    .into_iter()
                    .map(|group| GroupSummary {
                        group_id: group.group_id,
                        name: group.name,
                    })
                    .collect(),
            },
            Err(err) => {
                log_failure("GetGroupsByUID", &err);
                GetGroupsByUidResponse {
                    result: Some(failure(&err)),
                    groups: Vec::new(),
                }
            }
        };
        Ok(Response::new(response))
    }
}
