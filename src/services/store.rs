use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::{Category, Expense, ExpenseForm, Member, Photo, RoleType, SavedPhoto};

/// Optional filters applied to expense listings. `owner` scopes the result
/// to one member; admins pass `None` to see everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpenseFilter {
    pub owner: Option<i64>,
    pub category: Option<Category>,
}

/// All database access goes through this service; handlers never touch the
/// pool directly.
pub struct StoreService {
    pool: SqlitePool,
}

impl StoreService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_member(
        &self,
        username: &str,
        password_hash: &str,
        role: RoleType,
    ) -> Result<Member, sqlx::Error> {
        sqlx::query_as::<_, Member>(
            "INSERT INTO member (username, password_hash, role) VALUES (?, ?, ?) \
             RETURNING id, username, password_hash, role",
        )
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_member(&self, username: &str) -> Result<Option<Member>, sqlx::Error> {
        sqlx::query_as::<_, Member>(
            "SELECT id, username, password_hash, role FROM member WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create_expense(
        &self,
        member_id: i64,
        form: &ExpenseForm,
    ) -> Result<Expense, sqlx::Error> {
        sqlx::query_as::<_, Expense>(
            "INSERT INTO expense (title, content, amount, category, member_id, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             RETURNING id, title, content, amount, category, member_id, created_at",
        )
        .bind(&form.title)
        .bind(&form.content)
        .bind(form.amount)
        .bind(form.category)
        .bind(member_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get_expense(&self, id: i64) -> Result<Option<Expense>, sqlx::Error> {
        sqlx::query_as::<_, Expense>(
            "SELECT id, title, content, amount, category, member_id, created_at \
             FROM expense WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Page of expenses plus the unfiltered total, newest first.
    pub async fn list_expenses(
        &self,
        filter: ExpenseFilter,
        page: u32,
        size: u32,
    ) -> Result<(Vec<Expense>, i64), sqlx::Error> {
        let expenses = sqlx::query_as::<_, Expense>(
            "SELECT id, title, content, amount, category, member_id, created_at FROM expense \
             WHERE (?1 IS NULL OR member_id = ?1) AND (?2 IS NULL OR category = ?2) \
             ORDER BY created_at DESC, id DESC LIMIT ?3 OFFSET ?4",
        )
        .bind(filter.owner)
        .bind(filter.category)
        .bind(i64::from(size))
        .bind(i64::from(page) * i64::from(size))
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM expense \
             WHERE (?1 IS NULL OR member_id = ?1) AND (?2 IS NULL OR category = ?2)",
        )
        .bind(filter.owner)
        .bind(filter.category)
        .fetch_one(&self.pool)
        .await?;

        Ok((expenses, total.0))
    }

    /// Owner and `created_at` are deliberately left out of the update.
    pub async fn update_expense(
        &self,
        id: i64,
        form: &ExpenseForm,
    ) -> Result<Expense, sqlx::Error> {
        sqlx::query_as::<_, Expense>(
            "UPDATE expense SET title = ?, content = ?, amount = ?, category = ? WHERE id = ? \
             RETURNING id, title, content, amount, category, member_id, created_at",
        )
        .bind(&form.title)
        .bind(&form.content)
        .bind(form.amount)
        .bind(form.category)
        .bind(id)
        .fetch_one(&self.pool)
        .await
    }

    /// Remove an expense and its photo rows. Returns the removed photos so
    /// the caller can clean up the stored files.
    pub async fn delete_expense(&self, id: i64) -> Result<Vec<Photo>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let photos = sqlx::query_as::<_, Photo>(
            "DELETE FROM photo WHERE expense_id = ? \
             RETURNING id, expense_id, file_name, file_path, file_type, file_size, uploaded_at",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM expense WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(photos)
    }

    pub async fn add_photos(
        &self,
        expense_id: i64,
        photos: &[SavedPhoto],
    ) -> Result<Vec<Photo>, sqlx::Error> {
        let mut saved = Vec::with_capacity(photos.len());
        for photo in photos {
            let row = sqlx::query_as::<_, Photo>(
                "INSERT INTO photo (expense_id, file_name, file_path, file_type, file_size, uploaded_at) \
                 VALUES (?, ?, ?, ?, ?, ?) \
                 RETURNING id, expense_id, file_name, file_path, file_type, file_size, uploaded_at",
            )
            .bind(expense_id)
            .bind(&photo.file_name)
            .bind(&photo.file_path)
            .bind(&photo.file_type)
            .bind(photo.file_size)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
            saved.push(row);
        }
        Ok(saved)
    }

    pub async fn photos_for_expense(&self, expense_id: i64) -> Result<Vec<Photo>, sqlx::Error> {
        sqlx::query_as::<_, Photo>(
            "SELECT id, expense_id, file_name, file_path, file_type, file_size, uploaded_at \
             FROM photo WHERE expense_id = ? ORDER BY id",
        )
        .bind(expense_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Drop the current photo rows for an expense and record new ones.
    /// Returns the replaced rows so the caller can delete the old files.
    pub async fn replace_photos(
        &self,
        expense_id: i64,
        photos: &[SavedPhoto],
    ) -> Result<Vec<Photo>, sqlx::Error> {
        let removed = sqlx::query_as::<_, Photo>(
            "DELETE FROM photo WHERE expense_id = ? \
             RETURNING id, expense_id, file_name, file_path, file_type, file_size, uploaded_at",
        )
        .bind(expense_id)
        .fetch_all(&self.pool)
        .await?;

        self.add_photos(expense_id, photos).await?;
        Ok(removed)
    }
}

impl Clone for StoreService {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_store() -> StoreService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        StoreService::new(pool)
    }

    fn form(title: &str, amount: f64, category: Category) -> ExpenseForm {
        ExpenseForm {
            title: title.to_string(),
            content: "details".to_string(),
            amount,
            category,
        }
    }

    #[tokio::test]
    async fn member_roundtrip() {
        let store = test_store().await;
        let created = store
            .create_member("alice", "$2b$fakehash", RoleType::User)
            .await
            .unwrap();

        let found = store.find_member("alice").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.role, RoleType::User);
        assert!(store.find_member("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = test_store().await;
        store
            .create_member("alice", "h1", RoleType::User)
            .await
            .unwrap();
        assert!(store.create_member("alice", "h2", RoleType::User).await.is_err());
    }

    #[tokio::test]
    async fn expense_crud() {
        let store = test_store().await;
        let member = store
            .create_member("bob", "h", RoleType::User)
            .await
            .unwrap();

        let expense = store
            .create_expense(member.id, &form("Lunch", 12.5, Category::Food))
            .await
            .unwrap();
        assert_eq!(expense.member_id, member.id);

        let updated = store
            .update_expense(expense.id, &form("Dinner", 30.0, Category::Food))
            .await
            .unwrap();
        assert_eq!(updated.title, "Dinner");
        // Owner and creation time survive updates.
        assert_eq!(updated.member_id, member.id);
        assert_eq!(updated.created_at, expense.created_at);

        store.delete_expense(expense.id).await.unwrap();
        assert!(store.get_expense(expense.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn listing_scopes_and_paginates() {
        let store = test_store().await;
        let bob = store.create_member("bob", "h", RoleType::User).await.unwrap();
        let eve = store.create_member("eve", "h", RoleType::User).await.unwrap();

        for i in 0..12 {
            store
                .create_expense(bob.id, &form(&format!("bob-{i}"), 1.0, Category::Food))
                .await
                .unwrap();
        }
        store
            .create_expense(eve.id, &form("eve-0", 2.0, Category::Transport))
            .await
            .unwrap();

        // Unscoped listing sees everything.
        let (all, total) = store.list_expenses(ExpenseFilter::default(), 0, 10).await.unwrap();
        assert_eq!(all.len(), 10);
        assert_eq!(total, 13);

        // Owner scoping.
        let filter = ExpenseFilter {
            owner: Some(bob.id),
            ..Default::default()
        };
        let (page0, total) = store.list_expenses(filter, 0, 10).await.unwrap();
        let (page1, _) = store.list_expenses(filter, 1, 10).await.unwrap();
        assert_eq!(total, 12);
        assert_eq!(page0.len(), 10);
        assert_eq!(page1.len(), 2);
        assert!(page0.iter().all(|e| e.member_id == bob.id));

        // Category scoping composes with ownership.
        let filter = ExpenseFilter {
            owner: Some(bob.id),
            category: Some(Category::Transport),
        };
        let (none, total) = store.list_expenses(filter, 0, 10).await.unwrap();
        assert!(none.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn photos_are_replaced_wholesale() {
        let store = test_store().await;
        let bob = store.create_member("bob", "h", RoleType::User).await.unwrap();
        let expense = store
            .create_expense(bob.id, &form("Hotel", 120.0, Category::Lodging))
            .await
            .unwrap();

        let first = SavedPhoto {
            file_name: "receipt.jpg".to_string(),
            file_path: "uploads/a_receipt.jpg".to_string(),
            file_type: Some("image/jpeg".to_string()),
            file_size: 1024,
        };
        store.add_photos(expense.id, &[first]).await.unwrap();
        assert_eq!(store.photos_for_expense(expense.id).await.unwrap().len(), 1);

        let second = SavedPhoto {
            file_name: "invoice.png".to_string(),
            file_path: "uploads/b_invoice.png".to_string(),
            file_type: Some("image/png".to_string()),
            file_size: 2048,
        };
        let removed = store.replace_photos(expense.id, &[second]).await.unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].file_name, "receipt.jpg");

        let photos = store.photos_for_expense(expense.id).await.unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].file_name, "invoice.png");

        let removed = store.delete_expense(expense.id).await.unwrap();
        assert_eq!(removed.len(), 1);
    }
}
