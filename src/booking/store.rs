use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::dtos::appointment::{AppointmentRequest, StoredAppointment};

pub type DynAppointmentStore = Arc<dyn AppointmentStore + Send + Sync>;

/// 存储层失败的两种情况：远端明确拒绝（带可读信息），或者根本没能完成调用。
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Rejected(String),

    #[error("store unreachable: {0}")]
    Unreachable(String),
}

/// 预约持久化协作者：向 `appointments` 表插入一条记录。不重试、不批量。
#[async_trait]
pub trait AppointmentStore {
    async fn insert(&self, record: &AppointmentRequest) -> Result<StoredAppointment, StoreError>;
}
