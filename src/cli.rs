// 命令行参数

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::constants::env;
use crate::protocol::AuthType;
use crate::terminal::ConnectionForm;

#[derive(Parser, Debug)]
#[command(name = "webssh")]
#[command(about = "Browser-style SSH terminal relayed over WebSocket")]
#[command(version)]
pub struct Cli {
    /// 设置文件路径（默认位于用户配置目录）
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// 提高日志级别 (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the WebSocket to SSH relay
    Serve(ServeArgs),
    /// Open an interactive terminal through a relay (Ctrl-] quits)
    Connect(ConnectArgs),
    /// Manage saved connection profiles
    #[command(subcommand)]
    Profile(ProfileCommand),
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Listen address
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory served for non-WebSocket paths
    #[arg(long, value_name = "DIR")]
    pub static_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Relay WebSocket URL
    #[arg(long)]
    pub url: Option<String>,

    /// Start from a saved profile
    #[arg(long, value_name = "NAME")]
    pub profile: Option<String>,

    #[command(flatten)]
    pub form: FormArgs,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// List saved profiles
    List,
    /// Show one profile (secrets masked)
    Show { name: String },
    /// Save or overwrite a profile
    Save {
        name: String,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Delete a profile
    Delete { name: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CliAuthType {
    Password,
    Key,
}

impl From<CliAuthType> for AuthType {
    fn from(auth: CliAuthType) -> Self {
        match auth {
            CliAuthType::Password => AuthType::Password,
            CliAuthType::Key => AuthType::Key,
        }
    }
}

/// 连接表单字段，未给出的字段保持原值
#[derive(Args, Debug, Default)]
pub struct FormArgs {
    /// SSH host
    #[arg(long)]
    pub host: Option<String>,

    /// SSH port
    #[arg(short, long)]
    pub port: Option<String>,

    /// SSH username
    #[arg(short, long)]
    pub user: Option<String>,

    /// Authentication method (implied by --key-file)
    #[arg(long, value_enum)]
    pub auth: Option<CliAuthType>,

    #[arg(long, env = env::PASSWORD, hide_env_values = true)]
    pub password: Option<String>,

    /// Private key file (contents are sent, not the path)
    #[arg(long, value_name = "FILE")]
    pub key_file: Option<PathBuf>,

    #[arg(long, env = env::PASSPHRASE, hide_env_values = true)]
    pub passphrase: Option<String>,
}

impl FormArgs {
    pub fn apply(&self, form: &mut ConnectionForm) -> Result<()> {
        if let Some(host) = &self.host {
            form.host = host.clone();
        }
        if let Some(port) = &self.port {
            form.port = port.clone();
        }
        if let Some(user) = &self.user {
            form.username = user.clone();
        }
        if let Some(password) = &self.password {
            form.password = password.clone();
        }
        if let Some(path) = &self.key_file {
            form.private_key = std::fs::read_to_string(path)
                .with_context(|| format!("Unable to read key file {:?}", path))?;
            form.auth_type = AuthType::Key;
        }
        if let Some(passphrase) = &self.passphrase {
            form.passphrase = passphrase.clone();
        }
        if let Some(auth) = self.auth {
            form.auth_type = auth.into();
        }
        Ok(())
    }
}
