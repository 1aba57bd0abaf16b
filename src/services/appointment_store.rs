// src/services/appointment_store.rs
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{sqlx, *};
use uuid::Uuid;

use crate::{
    booking::{AppointmentStore, StoreError},
    core::constants::APPOINTMENTS_TABLE,
    dtos::appointment::{AppointmentRequest, StoredAppointment},
    entity::appointments,
};

/// 基于 SeaORM 的预约存储，写入 Postgres 的 `appointments` 表。
#[derive(Clone)]
pub struct SeaOrmAppointmentStore {
    db: DatabaseConnection,
}

impl SeaOrmAppointmentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AppointmentStore for SeaOrmAppointmentStore {
    /// 插入一条预约记录，并统计当天（含本条）的预约数作为排队号。
    ///
    /// 加锁、插入、计数在同一个事务内完成：事务级 advisory lock 按日期串行化同一天的预约，
    /// 保证并发提交拿到的排队号互不相同。任何一步失败都会回滚，不会留下没有排队号的记录。
    async fn insert(&self, record: &AppointmentRequest) -> Result<StoredAppointment, StoreError> {
        let id = Uuid::new_v4();
        let model = appointments::ActiveModel {
            id: Set(id),
            name: Set(record.name.clone()),
            email: Set(record.email.clone()),
            phone: Set(record.phone.clone()),
            service: Set(record.service.clone()),
            doctor: Set(record.doctor.clone()),
            date: Set(record.date),
            time: Set(record.time.clone()),
            message: Set(record.message.clone()),
            created_at: Set(Utc::now().into()),
        };

        let txn = self.db.begin().await.map_err(classify)?;

        // 1. 锁住这一天，锁在提交或回滚时自动释放
        txn.execute(Statement::from_sql_and_values(
            txn.get_database_backend(),
            "SELECT pg_advisory_xact_lock($1)",
            [queue_lock_key(record.date).into()],
        ))
        .await
        .map_err(classify)?;

        // 2. 主键由应用生成，不需要 RETURNING
        appointments::Entity::insert(model)
            .exec_without_returning(&txn)
            .await
            .map_err(classify)?;

        // 3. 同一事务内计数，能看到本条以及所有已提交的同日预约
        let queue_number = appointments::Entity::find()
            .filter(appointments::Column::Date.eq(record.date))
            .count(&txn)
            .await
            .map_err(classify)?;

        txn.commit().await.map_err(classify)?;
        tracing::debug!("🔢 {} queue {} on {} for {}", APPOINTMENTS_TABLE, queue_number, record.date, id);

        Ok(StoredAppointment { id, queue_number })
    }
}

/// 按日期生成 advisory lock 的键：公元纪年以来的天数，同一天总是同一个键。
fn queue_lock_key(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

/// 区分 "连不上" 与 "被拒绝"：连接、连接池、网络 I/O 与 TLS 错误视为不可达，
/// 其余数据库错误（约束冲突、类型错误等）视为拒绝，错误信息原样带回。
fn classify(err: DbErr) -> StoreError {
    let unreachable = match &err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => true,
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e)) => matches!(
            e,
            sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::WorkerCrashed
        ),
        _ => false,
    };

    if unreachable {
        StoreError::Unreachable(err.to_string())
    } else {
        StoreError::Rejected(err.to_string())
    }
}
