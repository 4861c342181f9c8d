//! Shops and their user permissions
//!
//! A shop is created together with its owner: an employee login in the new
//! shop plus an owner row in `shopusers`. Every later call is made with a
//! token for that shop; roles in `shopusers` decide who may change the shop
//! and its permissions.

use std::sync::Arc;

use shared::models::{
    Document, Employee, LoginResponse, MIN_PASSWORD_LEN, ROLE_ADMIN, ROLE_OWNER,
    RegisterShopRequest, Shop, ShopMembership, ShopUser,
};
use shared::util::{new_guid, now_millis};
use shared::{AppError, ErrorCode, Pageable, Pagination};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use super::new_document;
use crate::auth::{AuthIdentity, create_token};
use crate::db::repository::CrudRepository;
use crate::db::repository::filter::escape_like;
use crate::error::ServiceResult;
use crate::modules::employee::EmployeeModule;
use crate::modules::{SHOP_COLLECTION, SHOP_USER_COLLECTION};
use crate::services::MasterService;

#[derive(FromRow)]
struct MembershipRow {
    shopid: String,
    name: String,
    role: i64,
    isfavorite: i64,
}

impl From<MembershipRow> for ShopMembership {
    fn from(row: MembershipRow) -> Self {
        Self {
            shopid: row.shopid,
            name: row.name,
            role: row.role as i16,
            isfavorite: row.isfavorite != 0,
        }
    }
}

pub struct ShopService {
    pool: SqlitePool,
    shops: CrudRepository<Shop>,
    users: CrudRepository<ShopUser>,
    employees: Arc<MasterService<EmployeeModule>>,
}

impl ShopService {
    pub fn new(pool: SqlitePool, employees: Arc<MasterService<EmployeeModule>>) -> Self {
        Self {
            shops: CrudRepository::new(pool.clone(), SHOP_COLLECTION),
            users: CrudRepository::new(pool.clone(), SHOP_USER_COLLECTION),
            pool,
            employees,
        }
    }

    /// Create a shop, its owner login and owner permission, and sign the
    /// owner in
    pub async fn register(
        &self,
        jwt_secret: &str,
        req: RegisterShopRequest,
    ) -> ServiceResult<LoginResponse> {
        req.validate()?;
        if (req.password.chars().count() as u64) < MIN_PASSWORD_LEN {
            return Err(AppError::new(ErrorCode::PasswordTooShort).into());
        }

        let shop_id = new_guid();
        let shop = Document {
            guidfixed: shop_id.clone(),
            ..new_document(&shop_id, &req.username, req.shop)
        };
        self.shops.create(&shop).await?;

        let owner = Employee {
            code: req.username.clone(),
            name: req.name.clone(),
            password: Some(req.password),
            roles: vec!["owner".to_string()],
            ..Default::default()
        };
        self.employees.create(&shop_id, &req.username, owner).await?;

        let permission = ShopUser {
            username: req.username.clone(),
            role: ROLE_OWNER,
            isfavorite: false,
        };
        self.users
            .create(&new_document(&shop_id, &req.username, permission))
            .await?;

        let token = create_token(&shop_id, &req.username, jwt_secret)
            .map_err(|e| AppError::internal(format!("Failed to issue token: {e}")))?;
        tracing::info!(shop_id = %shop_id, username = %req.username, "Shop registered");
        Ok(LoginResponse {
            token,
            shopid: shop_id,
            username: req.username,
            name: req.name,
        })
    }

    /// Role of `username` in the shop, `None` without a permission row
    pub async fn role_of(&self, shop_id: &str, username: &str) -> ServiceResult<Option<i16>> {
        Ok(self
            .users
            .find_by_doc_identity_guid(shop_id, "username", username)
            .await?
            .map(|doc| doc.data.role))
    }

    /// Only the shop the caller's token was issued for is visible
    fn ensure_same_shop(caller: &AuthIdentity, shop_id: &str) -> ServiceResult<()> {
        if caller.shop_id != shop_id {
            return Err(AppError::permission_denied("permission denied").into());
        }
        Ok(())
    }

    async fn ensure_owner(&self, caller: &AuthIdentity) -> ServiceResult<()> {
        match self.role_of(&caller.shop_id, &caller.username).await? {
            Some(ROLE_OWNER) => Ok(()),
            _ => Err(AppError::permission_denied("permission denied").into()),
        }
    }

    pub async fn info(&self, caller: &AuthIdentity, shop_id: &str) -> ServiceResult<Document<Shop>> {
        Self::ensure_same_shop(caller, shop_id)?;
        self.shops
            .find_by_guid(shop_id, shop_id)
            .await?
            .ok_or_else(|| AppError::shop_not_found().into())
    }

    pub async fn update(&self, caller: &AuthIdentity, shop_id: &str, shop: Shop) -> ServiceResult<()> {
        shop.validate()?;
        Self::ensure_same_shop(caller, shop_id)?;
        self.ensure_owner(caller).await?;
        self.shops
            .update(shop_id, shop_id, &shop, &caller.username, now_millis())
            .await?;
        tracing::info!(shop_id = %shop_id, username = %caller.username, "Shop updated");
        Ok(())
    }

    pub async fn delete(&self, caller: &AuthIdentity, shop_id: &str) -> ServiceResult<()> {
        Self::ensure_same_shop(caller, shop_id)?;
        self.ensure_owner(caller).await?;
        self.shops
            .delete_by_guidfixed(shop_id, shop_id, &caller.username, now_millis())
            .await?;
        tracing::info!(shop_id = %shop_id, username = %caller.username, "Shop deleted");
        Ok(())
    }

    /// Live shops `username` holds a permission in, matched on the shop name
    pub async fn search(
        &self,
        username: &str,
        pageable: &Pageable,
    ) -> ServiceResult<(Vec<ShopMembership>, Pagination)> {
        let total: i64 = {
            let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*)");
            Self::push_membership_from(&mut qb, username, &pageable.q);
            qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?
        };

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT s.guid_fixed AS shopid, \
             COALESCE(json_extract(s.doc, '$.name1'), '') AS name, \
             COALESCE(json_extract(u.doc, '$.role'), 0) AS role, \
             COALESCE(json_extract(u.doc, '$.isfavorite'), 0) AS isfavorite",
        );
        Self::push_membership_from(&mut qb, username, &pageable.q);
        qb.push(" ORDER BY isfavorite DESC, s.created_at ASC, s.id ASC LIMIT ")
            .push_bind(pageable.limit)
            .push(" OFFSET ")
            .push_bind(pageable.offset());
        let rows = qb
            .build_query_as::<MembershipRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok((
            rows.into_iter().map(ShopMembership::from).collect(),
            Pagination::new(total, pageable.page, pageable.limit),
        ))
    }

    fn push_membership_from(qb: &mut QueryBuilder<'_, Sqlite>, username: &str, q: &str) {
        qb.push(
            " FROM documents u JOIN documents s \
             ON s.collection = ",
        )
        .push_bind(SHOP_COLLECTION)
        .push(
            " AND s.shop_id = u.shop_id AND s.guid_fixed = u.shop_id AND s.deleted_at IS NULL \
             WHERE u.collection = ",
        )
        .push_bind(SHOP_USER_COLLECTION)
        .push(" AND u.deleted_at IS NULL AND json_extract(u.doc, '$.username') = ")
        .push_bind(username.to_string());
        for token in q.split_whitespace() {
            qb.push(" AND json_extract(s.doc_folded, '$.name1') LIKE ")
                .push_bind(format!("%{}%", escape_like(&token.to_lowercase())))
                .push(" ESCAPE '\\'");
        }
    }

    /// Permissions of the caller's shop
    pub async fn users(&self, caller: &AuthIdentity) -> ServiceResult<Vec<ShopUser>> {
        let docs = self.users.find_filter(&caller.shop_id, &[]).await?;
        Ok(docs.into_iter().map(|doc| doc.data).collect())
    }

    pub async fn permission(&self, caller: &AuthIdentity, username: &str) -> ServiceResult<ShopUser> {
        self.users
            .find_by_doc_identity_guid(&caller.shop_id, "username", username)
            .await?
            .map(|doc| doc.data)
            .ok_or_else(|| AppError::document_not_found().into())
    }

    /// Grant or change a user's role; owner only, never on oneself
    pub async fn save_permission(&self, caller: &AuthIdentity, user: ShopUser) -> ServiceResult<()> {
        user.validate()?;
        self.ensure_owner(caller).await?;
        if user.username == caller.username {
            return Err(AppError::permission_denied("can not edit self permission").into());
        }

        match self
            .users
            .find_by_doc_identity_guid(&caller.shop_id, "username", user.username.as_str())
            .await?
        {
            Some(existing) => {
                self.users
                    .update(
                        &caller.shop_id,
                        &existing.guidfixed,
                        &user,
                        &caller.username,
                        now_millis(),
                    )
                    .await?;
            }
            None => {
                self.users
                    .create(&new_document(&caller.shop_id, &caller.username, user.clone()))
                    .await?;
            }
        }
        tracing::info!(
            shop_id = %caller.shop_id,
            username = %user.username,
            role = user.role,
            "Shop permission saved"
        );
        Ok(())
    }

    /// Owners may remove anyone else; admins may remove non-owners
    pub async fn delete_permission(&self, caller: &AuthIdentity, username: &str) -> ServiceResult<()> {
        let caller_role = self.role_of(&caller.shop_id, &caller.username).await?;
        if !matches!(caller_role, Some(ROLE_OWNER) | Some(ROLE_ADMIN)) {
            return Err(AppError::permission_denied("permission denied").into());
        }
        if username == caller.username {
            return Err(AppError::permission_denied("can't delete your permission").into());
        }

        let target = self
            .users
            .find_by_doc_identity_guid(&caller.shop_id, "username", username)
            .await?
            .ok_or_else(AppError::document_not_found)?;
        if target.data.role == ROLE_OWNER && caller_role != Some(ROLE_OWNER) {
            return Err(AppError::permission_denied("permission denied").into());
        }

        self.users
            .delete_by_guidfixed(&caller.shop_id, &target.guidfixed, &caller.username, now_millis())
            .await?;
        tracing::info!(shop_id = %caller.shop_id, username, "Shop permission removed");
        Ok(())
    }
}
