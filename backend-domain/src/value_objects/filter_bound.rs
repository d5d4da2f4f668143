// Filter bound value object

use serde::{Deserialize, Serialize};

/// Which side of a range an item property constrains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterBound {
    #[default]
    Min,
    Max,
}
