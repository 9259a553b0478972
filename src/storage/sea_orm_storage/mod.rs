//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite 和 PostgreSQL。

mod classes;
mod invites;
mod members;
mod users;

use crate::config::AppConfig;
use crate::errors::{ClassHubError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| ClassHubError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| ClassHubError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            // 级联删除依赖外键约束
            .foreign_keys(true)
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| ClassHubError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| ClassHubError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 测试用内存数据库（单连接，连接关闭即销毁）
    #[cfg(test)]
    pub(crate) async fn new_in_memory() -> Result<Self> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| ClassHubError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .foreign_keys(true);

        // 内存库随连接销毁，必须固定单连接
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opt)
            .await
            .map_err(|e| ClassHubError::database_connection(format!("SQLite 连接失败: {e}")))?;

        let db = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);
        Migrator::up(&db, None)
            .await
            .map_err(|e| ClassHubError::database_operation(format!("数据库迁移失败: {e}")))?;

        Ok(Self { db })
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(url.to_string())
        } else {
            Err(ClassHubError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    classes::entities::{Class, ClassDetail, RequiredField},
    invites::entities::{Invite, InviteType},
    members::entities::{ClassMember, ClassRole, StudentField},
    users::entities::User,
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    // 班级模块
    async fn create_class(
        &self,
        creator: &User,
        name: &str,
        description: Option<String>,
        fields: Vec<RequiredField>,
    ) -> Result<ClassDetail> {
        self.create_class_impl(creator, name, description, fields)
            .await
    }

    async fn get_class_by_id(&self, class_id: &str) -> Result<Option<Class>> {
        self.get_class_by_id_impl(class_id).await
    }

    async fn get_class_detail(&self, class_id: &str) -> Result<Option<ClassDetail>> {
        self.get_class_detail_impl(class_id).await
    }

    // 班级信息键值模块
    async fn insert_class_info(&self, class_id: &str, name: &str, value: &str) -> Result<bool> {
        self.insert_class_info_impl(class_id, name, value).await
    }

    async fn update_class_info(&self, class_id: &str, name: &str, value: &str) -> Result<bool> {
        self.update_class_info_impl(class_id, name, value).await
    }

    async fn delete_class_info(&self, class_id: &str, name: &str) -> Result<bool> {
        self.delete_class_info_impl(class_id, name).await
    }

    // 邀请模块
    async fn create_invite(
        &self,
        class_id: &str,
        invite_type: InviteType,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<Invite> {
        self.create_invite_impl(class_id, invite_type, expires_at)
            .await
    }

    async fn get_invite(&self, class_id: &str, invite_id: &str) -> Result<Option<Invite>> {
        self.get_invite_impl(class_id, invite_id).await
    }

    async fn class_has_invites(&self, class_id: &str) -> Result<bool> {
        self.class_has_invites_impl(class_id).await
    }

    async fn delete_expired_invites(&self, class_id: &str) -> Result<u64> {
        self.delete_expired_invites_impl(class_id).await
    }

    // 班级成员模块
    async fn get_member(&self, user_id: i64, class_id: &str) -> Result<Option<ClassMember>> {
        self.get_member_impl(user_id, class_id).await
    }

    async fn join_class(
        &self,
        user: &User,
        class_id: &str,
        role: ClassRole,
        headline: Option<String>,
        information: Vec<StudentField>,
    ) -> Result<Option<ClassMember>> {
        self.join_class_impl(user, class_id, role, headline, information)
            .await
    }

    async fn remove_member(&self, member: &ClassMember) -> Result<Vec<String>> {
        self.remove_member_impl(member).await
    }
}
