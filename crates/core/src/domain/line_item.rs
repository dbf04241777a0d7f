use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

use crate::domain::support::SupportPlan;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(pub String);

/// The priced fields shared by top-level line items and their children.
///
/// Numeric fields are coerced on the way in: a missing, null or non-numeric
/// size or channel count reads as zero, so pricing never sees a value it
/// cannot multiply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafItem {
    #[serde(default)]
    pub id: LineItemId,
    #[serde(default)]
    pub asset_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub size: Decimal,
    #[serde(default = "default_quantity", deserialize_with = "lenient_count")]
    pub quantity: u32,
    #[serde(default)]
    pub sustainability: bool,
    #[serde(default)]
    pub security: bool,
    #[serde(default, deserialize_with = "lenient_count")]
    pub security_channels: u32,
    #[serde(default)]
    pub mobility: bool,
    #[serde(default, deserialize_with = "lenient_count")]
    pub mobility_channels: u32,
    #[serde(default)]
    pub insight: bool,
    #[serde(default)]
    pub support_plan: SupportPlan,
}

pub type SubLineItem = LeafItem;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(flatten)]
    pub leaf: LeafItem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_main_asset: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_line_items: Vec<SubLineItem>,
}

/// How a line item takes part in aggregation.
///
/// A bucket is priced only through its children; its own flags and size
/// never reach the totals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineItemKind<'a> {
    Leaf(&'a LeafItem),
    Bucket { sub_main_asset: Option<&'a str>, children: &'a [SubLineItem] },
}

fn default_quantity() -> u32 {
    1
}

impl LeafItem {
    /// A fresh item with the defaults the quote builder starts from.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: LineItemId(id.into()),
            asset_type: "Commercial Building".to_string(),
            description: String::new(),
            size: Decimal::from(1000),
            quantity: 1,
            sustainability: false,
            security: false,
            security_channels: 0,
            mobility: false,
            mobility_channels: 0,
            insight: false,
            support_plan: SupportPlan::default(),
        }
    }

    /// Switching security off also clears its channel count.
    pub fn set_security(&mut self, enabled: bool) {
        self.security = enabled;
        if !enabled {
            self.security_channels = 0;
        }
    }

    /// Switching mobility off also clears its channel count.
    pub fn set_mobility(&mut self, enabled: bool) {
        self.mobility = enabled;
        if !enabled {
            self.mobility_channels = 0;
        }
    }
}

impl LineItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self::from_leaf(LeafItem::new(id))
    }

    pub fn from_leaf(leaf: LeafItem) -> Self {
        Self { leaf, sub_main_asset: None, sub_line_items: Vec::new() }
    }

    pub fn kind(&self) -> LineItemKind<'_> {
        if self.sub_line_items.is_empty() {
            LineItemKind::Leaf(&self.leaf)
        } else {
            LineItemKind::Bucket {
                sub_main_asset: self.sub_main_asset.as_deref(),
                children: &self.sub_line_items,
            }
        }
    }

    pub fn is_bucket(&self) -> bool {
        matches!(self.kind(), LineItemKind::Bucket { .. })
    }

    /// Label shown for the row in detail tables.
    pub fn display_asset(&self) -> &str {
        self.sub_main_asset.as_deref().filter(|value| !value.is_empty()).unwrap_or(
            if self.leaf.asset_type.is_empty() { "-" } else { &self.leaf.asset_type },
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(Decimal),
    Other(IgnoredAny),
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LenientNumber::deserialize(deserializer)? {
        LenientNumber::Number(value) => value,
        LenientNumber::Other(_) => Decimal::ZERO,
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LenientNumber::deserialize(deserializer)? {
        LenientNumber::Number(value) if value.is_sign_positive() => value.trunc().to_u32().unwrap_or(0),
        _ => 0,
    })
}
