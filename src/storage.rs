use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serenity::model::id::{ChannelId, GuildId};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::{fs, sync::Mutex};
use tracing::{info, warn};

use crate::audio::equalizer::EqualizerBands;

/// Configuración de audio de un guild, leída una vez por evento
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildAudioSettings {
    pub repeat: bool,
    pub notify: bool,
    #[serde(rename = "disconnect")]
    pub disconnect_on_empty: bool,
    #[serde(rename = "auto_play")]
    pub autoplay: bool,
    #[serde(rename = "thumbnail")]
    pub show_thumbnail: bool,
}

impl Default for GuildAudioSettings {
    fn default() -> Self {
        Self {
            repeat: false,
            notify: false,
            disconnect_on_empty: false,
            autoplay: false,
            show_thumbnail: true,
        }
    }
}

/// Registro persistido por guild
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildRecord {
    pub guild_id: u64,
    #[serde(flatten)]
    pub settings: GuildAudioSettings,
    pub announcement_channel_id: Option<u64>,
    pub eq_bands: Option<EqualizerBands>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Configuración global del bot
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalRecord {
    /// Reportar la reproducción en la presencia del bot
    pub status: bool,
}

/// Proveedor de configuración consultado por el reactor
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn guild_settings(&self, guild_id: GuildId) -> GuildAudioSettings;

    async fn status_enabled(&self) -> bool;

    async fn notify_channel(&self, guild_id: GuildId) -> Option<ChannelId>;
}

/// Persistencia de las bandas del ecualizador
#[async_trait]
pub trait EqualizerStore: Send + Sync {
    async fn set_equalizer_bands(&self, guild_id: GuildId, bands: EqualizerBands) -> Result<()>;

    async fn equalizer_bands(&self, guild_id: GuildId) -> Option<EqualizerBands>;
}

/// Manager de almacenamiento basado en archivos JSON
pub struct JsonStorage {
    data_dir: PathBuf,
    guilds_cache: HashMap<u64, GuildRecord>,
    global: GlobalRecord,
}

impl JsonStorage {
    pub async fn new(data_dir: PathBuf) -> Result<Self> {
        let guilds_dir = data_dir.join("guilds");
        fs::create_dir_all(&guilds_dir).await?;

        info!("📁 Storage inicializado en: {}", data_dir.display());

        let mut storage = Self {
            data_dir,
            guilds_cache: HashMap::new(),
            global: GlobalRecord::default(),
        };

        storage.load_all_guilds().await?;
        storage.load_global().await;

        Ok(storage)
    }

    /// Registro del guild, o uno por defecto si no existe
    pub fn guild_record(&self, guild_id: u64) -> GuildRecord {
        self.guilds_cache
            .get(&guild_id)
            .cloned()
            .unwrap_or_else(|| GuildRecord {
                guild_id,
                ..GuildRecord::default()
            })
    }

    /// Actualiza el registro de un guild
    pub async fn update_guild_record(&mut self, mut record: GuildRecord) -> Result<()> {
        record.updated_at = Some(Utc::now());
        let guild_id = record.guild_id;

        self.save_guild_record(&record).await?;
        self.guilds_cache.insert(guild_id, record);

        info!("💾 Configuración actualizada para guild {}", guild_id);
        Ok(())
    }

    pub async fn set_equalizer(&mut self, guild_id: u64, bands: EqualizerBands) -> Result<()> {
        let mut record = self.guild_record(guild_id);
        record.eq_bands = Some(bands);
        self.update_guild_record(record).await
    }

    pub fn global(&self) -> GlobalRecord {
        self.global
    }

    // Métodos privados

    async fn load_guild_record(&self, guild_id: u64) -> Result<GuildRecord> {
        let content = fs::read_to_string(self.guild_file_path(guild_id)).await?;
        let record: GuildRecord = serde_json::from_str(&content)?;
        Ok(record)
    }

    async fn save_guild_record(&self, record: &GuildRecord) -> Result<()> {
        let content = serde_json::to_string_pretty(record)?;
        fs::write(self.guild_file_path(record.guild_id), content).await?;
        Ok(())
    }

    async fn load_all_guilds(&mut self) -> Result<()> {
        let mut files = fs::read_dir(self.data_dir.join("guilds")).await?;
        let mut loaded_count = 0;

        while let Some(entry) = files.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }

            let Some(guild_id) = path
                .file_stem()
                .and_then(|n| n.to_str())
                .and_then(|name| name.strip_prefix("guild_"))
                .and_then(|id| id.parse::<u64>().ok())
            else {
                continue;
            };

            match self.load_guild_record(guild_id).await {
                Ok(record) => {
                    self.guilds_cache.insert(guild_id, record);
                    loaded_count += 1;
                }
                Err(e) => {
                    warn!("Error cargando configuración para guild {}: {}", guild_id, e);
                }
            }
        }

        if loaded_count > 0 {
            info!("📂 Cargadas {} configuraciones de guild", loaded_count);
        }

        Ok(())
    }

    async fn load_global(&mut self) {
        let path = self.data_dir.join("global.json");
        let Ok(content) = fs::read_to_string(&path).await else {
            return;
        };

        match serde_json::from_str(&content) {
            Ok(global) => self.global = global,
            Err(e) => warn!("global.json inválido, usando valores por defecto: {}", e),
        }
    }

    fn guild_file_path(&self, guild_id: u64) -> PathBuf {
        self.data_dir.join("guilds").join(format!("guild_{}.json", guild_id))
    }
}

#[async_trait]
impl SettingsProvider for Mutex<JsonStorage> {
    async fn guild_settings(&self, guild_id: GuildId) -> GuildAudioSettings {
        self.lock().await.guild_record(guild_id.get()).settings
    }

    async fn status_enabled(&self) -> bool {
        self.lock().await.global().status
    }

    async fn notify_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        self.lock()
            .await
            .guild_record(guild_id.get())
            .announcement_channel_id
            .filter(|id| *id != 0)
            .map(ChannelId::new)
    }
}

#[async_trait]
impl EqualizerStore for Mutex<JsonStorage> {
    async fn set_equalizer_bands(&self, guild_id: GuildId, bands: EqualizerBands) -> Result<()> {
        self.lock().await.set_equalizer(guild_id.get(), bands).await
    }

    async fn equalizer_bands(&self, guild_id: GuildId) -> Option<EqualizerBands> {
        self.lock().await.guild_record(guild_id.get()).eq_bands
    }
}
