// 数据模型模块

pub mod profile;
pub mod settings;

pub use profile::{ConnectionProfile, ProfileConfig};
pub use settings::{AppSettings, ClientSettings, ConnectionSettings, Language};
