// 本地数据持久化服务

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::APP_DIR_NAME;
use crate::models::{AppSettings, ConnectionProfile, ProfileConfig};

/// 获取配置目录路径
/// macOS: ~/Library/Application Support/webssh
/// Linux: ~/.config/webssh
/// Windows: C:\Users\<用户名>\AppData\Roaming\webssh
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Unable to locate the system config directory")?
        .join(APP_DIR_NAME);
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir).context("Unable to create the config directory")?;
    }
    Ok(config_dir)
}

/// 获取设置配置文件路径
pub fn get_settings_file() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("settings.json"))
}

/// 获取连接配置文件路径
pub fn get_profiles_file() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("profiles.json"))
}

/// 加载应用设置（文件不存在时使用默认值）
pub fn load_settings(path: Option<&Path>) -> Result<AppSettings> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => get_settings_file()?,
    };
    if !path.exists() {
        debug!("[Storage] No settings file at {:?}, using defaults", path);
        return Ok(AppSettings::default());
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Unable to read settings file {:?}", path))?;
    let settings: AppSettings = serde_json::from_str(&content)
        .with_context(|| format!("Unable to parse settings file {:?}", path))?;
    Ok(settings)
}

/// 连接配置存储
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 使用默认配置目录
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(get_profiles_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 加载全部连接配置
    pub fn load(&self) -> Result<ProfileConfig> {
        if !self.path.exists() {
            return Ok(ProfileConfig::default());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Unable to read profiles file {:?}", self.path))?;
        let config: ProfileConfig = serde_json::from_str(&content)
            .with_context(|| format!("Unable to parse profiles file {:?}", self.path))?;
        Ok(config)
    }

    /// 保存全部连接配置
    pub fn save(&self, config: &ProfileConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Unable to create the profiles directory")?;
        }
        let content = serde_json::to_string_pretty(config).context("Unable to serialize profiles")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Unable to write profiles file {:?}", self.path))?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Option<ConnectionProfile>> {
        Ok(self.load()?.get(name).cloned())
    }

    /// 新增或覆盖同名配置，返回 true 表示覆盖
    pub fn upsert(&self, mut profile: ConnectionProfile) -> Result<bool> {
        let mut config = self.load()?;
        if profile.created_at.is_empty() && config.get(&profile.name).is_none() {
            profile.created_at = chrono::Local::now().to_rfc3339();
        }
        let replaced = config.upsert(profile);
        self.save(&config)?;
        Ok(replaced)
    }

    pub fn delete(&self, name: &str) -> Result<bool> {
        let mut config = self.load()?;
        let removed = config.remove(name);
        if removed {
            self.save(&config)?;
        }
        Ok(removed)
    }

    /// 更新最后连接时间
    pub fn touch_last_connected(&self, name: &str) -> Result<()> {
        let mut config = self.load()?;
        if let Some(profile) = config.profiles.iter_mut().find(|p| p.name == name) {
            profile.last_connected_at = Some(chrono::Local::now().to_rfc3339());
            self.save(&config)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;
    use crate::protocol::AuthType;

    #[test]
    fn test_profile_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("nested").join("profiles.json"));

        assert!(store.load().unwrap().profiles.is_empty());

        let profile = ConnectionProfile {
            name: "box".to_string(),
            host: "example.com".to_string(),
            username: "me".to_string(),
            auth_type: AuthType::Key,
            private_key: Some("KEY".to_string()),
            ..Default::default()
        };
        assert!(!store.upsert(profile).unwrap());

        let loaded = store.get("box").unwrap().unwrap();
        assert_eq!(loaded.host, "example.com");
        assert!(!loaded.created_at.is_empty());
        assert!(loaded.last_connected_at.is_none());

        store.touch_last_connected("box").unwrap();
        assert!(store.get("box").unwrap().unwrap().last_connected_at.is_some());

        assert!(store.delete("box").unwrap());
        assert!(!store.delete("box").unwrap());
        assert!(store.get("box").unwrap().is_none());
    }

    #[test]
    fn test_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let defaults = load_settings(Some(&path)).unwrap();
        assert_eq!(defaults.server.port, 3000);

        let mut settings = AppSettings::default();
        settings.server.port = 9000;
        settings.language = Language::Chinese;
        fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();

        let loaded = load_settings(Some(&path)).unwrap();
        assert_eq!(loaded.server.port, 9000);
        assert_eq!(loaded.language, Language::Chinese);
    }

    #[test]
    fn test_corrupt_profiles_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        fs::write(&path, "{not json").unwrap();
        assert!(ProfileStore::new(&path).load().is_err());
    }
}
