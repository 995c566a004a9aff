pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod grpc;
pub mod proto;
pub mod repository;
pub mod resolver;
pub mod service;
