pub mod abi;
pub mod artifacts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod deployments;
pub mod error;
pub mod fulfillment;
pub mod networks;
pub mod rpc;
pub mod scripts;
pub mod tx;
