use crate::configuration::Configuration;
use crate::context::ApplicationContext;
use crate::error::UnichatError;
use crate::server::run_server;
use crate::user::model::{NewUser, UserId, UserRole};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser)]
#[command(version, about)]
pub struct Commandline {
	#[clap(short = 'c', long = "config-file", default_value = "configuration.toml")]
	pub configuration_file_path: String,
	#[clap(subcommand)]
	pub command: Option<BaseCommand>,
}

#[derive(clap::Subcommand, Default)]
pub enum BaseCommand {
	/// Run the chat server
	#[default]
	Run,
	/// Print the configuration
	Configuration,
	/// Create a portal user and print its id
	CreateUser(CreateUserArguments),
	/// Print an access token for an existing user
	IssueToken {
		user_id: i64,
	},
}

#[derive(clap::Args)]
pub struct CreateUserArguments {
	pub username: String,
	#[arg(long, default_value = "")]
	pub first_name: String,
	#[arg(long, default_value = "")]
	pub second_name: String,
	#[arg(long, default_value = "")]
	pub patronymic: String,
	/// Path of the avatar below the media prefix
	#[arg(long)]
	pub avatar: Option<String>,
	/// One of `student`, `professor` or `none`
	#[arg(long, default_value = "none")]
	pub role: UserRole,
}

impl Commandline {
	pub async fn run(self) -> Result<(), UnichatError> {
		let configuration = Configuration::from_file(&self.configuration_file_path)?;
		tracing_subscriber::fmt()
			.with_env_filter(EnvFilter::try_new(&configuration.log_filters)?)
			.init();

		match self.command.unwrap_or_default() {
			BaseCommand::Run => run_server(ApplicationContext::new(configuration).await?).await?,
			BaseCommand::Configuration => println!("{configuration:#?}"),
			BaseCommand::CreateUser(arguments) => {
				create_user(ApplicationContext::new(configuration).await?, arguments).await?;
			}
			BaseCommand::IssueToken { user_id } => {
				issue_token(ApplicationContext::new(configuration).await?, UserId::from(user_id)).await?;
			}
		}
		Ok(())
	}
}

async fn create_user(application_context: ApplicationContext, arguments: CreateUserArguments) -> Result<(), UnichatError> {
	let new_user = NewUser {
		username: arguments.username,
		first_name: arguments.first_name,
		second_name: arguments.second_name,
		patronymic: arguments.patronymic,
		avatar: arguments.avatar,
		role: arguments.role,
	};

	let mut connection = application_context.database.connection().await?;
	let user = application_context
		.repository
		.user()
		.create(&mut *connection, &new_user)
		.await?;
	info!(user_id = %user.id, username = %user.username, "Created user.");
	println!("{}", user.id);
	Ok(())
}

async fn issue_token(application_context: ApplicationContext, user_id: UserId) -> Result<(), UnichatError> {
	let user = {
		let mut connection = application_context.database.connection().await?;
		application_context.repository.user().get(&mut *connection, user_id).await?
	};
	let Some(user) = user else {
		return Err(UnichatError::UnknownUser(user_id));
	};

	println!("{}", application_context.token_authority.issue(user.id)?);
	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;
	use clap::Parser;

	#[test]
	fn should_default_to_run() {
		let commandline = Commandline::try_parse_from(["unichat-server"]).expect("Failed to parse");

		assert_eq!("configuration.toml", commandline.configuration_file_path);
		assert!(matches!(commandline.command.unwrap_or_default(), BaseCommand::Run));
	}

	#[test]
	fn should_parse_create_user() {
		let commandline = Commandline::try_parse_from([
			"unichat-server",
			"-c",
			"other.toml",
			"create-user",
			"jdoe",
			"--first-name",
			"John",
			"--role",
			"professor",
		])
		.expect("Failed to parse");

		assert_eq!("other.toml", commandline.configuration_file_path);
		let Some(BaseCommand::CreateUser(arguments)) = commandline.command else {
			panic!("Expected create-user command");
		};
		assert_eq!("jdoe", arguments.username);
		assert_eq!("John", arguments.first_name);
		assert_eq!(UserRole::Professor, arguments.role);
		assert_eq!(None, arguments.avatar);
	}

	#[test]
	fn should_reject_unknown_role() {
		let result = Commandline::try_parse_from(["unichat-server", "create-user", "jdoe", "--role", "dean"]);

		assert!(result.is_err());
	}

	#[test]
	fn should_parse_issue_token() {
		let commandline =
			Commandline::try_parse_from(["unichat-server", "issue-token", "42"]).expect("Failed to parse");

		assert!(matches!(commandline.command, Some(BaseCommand::IssueToken { user_id: 42 })));
	}
}
