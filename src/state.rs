use crate::auth::IdentityResolver;
use crate::config::Config;
use crate::db::user_repository::UserRepository;
use crate::utils::jwt::TokenService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn UserRepository>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn resolver(&self) -> IdentityResolver {
        IdentityResolver::new(self.db.clone(), self.tokens.clone())
    }
}
