use crate::commandline::Commandline;
use crate::error::UnichatError;
use clap::Parser;

mod broadcast_group;
mod chat;
mod commandline;
mod configuration;
mod connection;
mod context;
mod database;
mod error;
mod lifecycle;
mod message;
mod presence;
mod room;
mod server;
mod token_authority;
mod user;
mod utils;

#[tokio::main]
async fn main() -> Result<(), UnichatError> {
	Commandline::parse().run().await
}
