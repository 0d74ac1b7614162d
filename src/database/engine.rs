//! Database Engine Abstraction Layer
//!
//! 接続・トランザクション・プリペアドステートメントの統一インターフェース

use super::{
    rows::RowCursor,
    types::{ExecuteResult, Value},
};
use crate::error::Result;
use async_trait::async_trait;

/// データベースエンジン抽象化トレイト
///
/// 接続を生成するファクトリ
#[async_trait]
pub trait DatabaseEngine: Send + Sync {
    /// エンジン名を返す
    fn name(&self) -> &str;

    /// 新しい接続を作成
    async fn connect(&self, dsn: &str) -> Result<Box<dyn DatabaseConnection>>;
}

/// データベース接続抽象化トレイト
#[async_trait]
pub trait DatabaseConnection: Send + Sync {
    /// プリペアドステートメントを準備
    async fn prepare(&self, sql: &str) -> Result<Box<dyn PreparedStatement>>;

    /// トランザクションを開始
    async fn begin_transaction(&self) -> Result<Box<dyn DatabaseTransaction>>;

    /// 接続の健全性をチェック
    async fn ping(&self) -> Result<()>;

    /// 接続を明示的に閉じる
    async fn close(&self) -> Result<()>;

    /// 接続固有の情報を取得
    fn connection_info(&self) -> ConnectionInfo;

    /// SELECTクエリを実行（prepare + query）
    async fn query(&self, sql: &str, params: &[Value]) -> Result<RowCursor> {
        let stmt = self.prepare(sql).await?;
        let rows = stmt.query(params).await?;
        stmt.close().await?;
        Ok(rows)
    }

    /// INSERT/UPDATE/DELETEコマンドを実行（prepare + execute）
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecuteResult> {
        let stmt = self.prepare(sql).await?;
        let result = stmt.execute(params).await?;
        stmt.close().await?;
        Ok(result)
    }
}

/// データベーストランザクション抽象化トレイト
///
/// Statements issued here are flagged as running inside the transaction.
#[async_trait]
pub trait DatabaseTransaction: Send + Sync {
    /// トランザクション内でステートメントを準備
    async fn prepare(&self, sql: &str) -> Result<Box<dyn PreparedStatement>>;

    /// トランザクションをコミット
    async fn commit(self: Box<Self>) -> Result<()>;

    /// トランザクションをロールバック
    async fn rollback(self: Box<Self>) -> Result<()>;

    /// トランザクション情報を取得
    fn transaction_info(&self) -> TransactionInfo;

    /// トランザクション内でクエリを実行
    async fn query(&self, sql: &str, params: &[Value]) -> Result<RowCursor> {
        let stmt = self.prepare(sql).await?;
        let rows = stmt.query(params).await?;
        stmt.close().await?;
        Ok(rows)
    }

    /// トランザクション内でコマンドを実行
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecuteResult> {
        let stmt = self.prepare(sql).await?;
        let result = stmt.execute(params).await?;
        stmt.close().await?;
        Ok(result)
    }
}

/// プリペアドステートメント抽象化トレイト
#[async_trait]
pub trait PreparedStatement: Send + Sync {
    /// プリペアドステートメントを実行（SELECT）
    async fn query(&self, params: &[Value]) -> Result<RowCursor>;

    /// プリペアドステートメントを実行（INSERT/UPDATE/DELETE）
    async fn execute(&self, params: &[Value]) -> Result<ExecuteResult>;

    /// ステートメントを破棄
    async fn close(&self) -> Result<()>;

    /// プレースホルダ数（`None` は不明、任意の引数数を受け付ける）
    fn num_input(&self) -> Option<usize>;
}

/// 接続情報
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub connection_id: String,
    pub dsn: String,
    pub connected_at: chrono::DateTime<chrono::Utc>,
}

/// トランザクション情報
#[derive(Debug, Clone)]
pub struct TransactionInfo {
    pub transaction_id: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
}
