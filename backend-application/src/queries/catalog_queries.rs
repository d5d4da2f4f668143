use backend_domain::CatalogOption;

use crate::AppState;

pub fn list_categories(state: &AppState) -> Vec<CatalogOption> {
    state.catalog.categories.clone()
}
