use crate::db::models::{
    PriceInfo, SkuPriceRow, VariantOption, VariantOptionGroup, VariantOptionRow,
};

use super::misc::format_yen;

pub const REGULAR_PRICE_TYPE: &str = "original";
pub const REGULAR_PRICE_NAME: &str = "通常価格";
pub const SALE_PRICE_NAME: &str = "セール価格";

/// Resolves the price a SKU sells for right now
///
/// # Arguments
/// * `row` - Regular price and in-window sale price of the SKU
///
/// # Returns
/// * `Option<PriceInfo>` - Sale price with the regular one as original amount,
///   the regular price when no sale runs, None when the SKU has no price at all
pub fn effective_price(row: &SkuPriceRow) -> Option<PriceInfo> {
    match (row.sale_price, row.regular_price) {
        (Some(sale), regular) => Some(PriceInfo {
            amount: sale,
            formatted_amount: format_yen(sale),
            price_type: row
                .sale_type_code
                .clone()
                .unwrap_or_else(|| "sale".to_string()),
            type_name: SALE_PRICE_NAME.to_string(),
            original_amount: regular,
            formatted_original_amount: regular.map(format_yen),
        }),
        (None, Some(regular)) => Some(PriceInfo {
            amount: regular,
            formatted_amount: format_yen(regular),
            price_type: REGULAR_PRICE_TYPE.to_string(),
            type_name: REGULAR_PRICE_NAME.to_string(),
            original_amount: None,
            formatted_original_amount: None,
        }),
        (None, None) => None,
    }
}

/// Folds ordered (attribute, option, sku) rows into variant groups
///
/// Rows must arrive ordered by attribute, then option, then SKU id. Group and option
/// order is kept as it arrives, linked SKU ids come out sorted and deduplicated.
pub fn group_variant_options(rows: Vec<VariantOptionRow>) -> Vec<VariantOptionGroup> {
    let mut groups: Vec<VariantOptionGroup> = Vec::new();

    for row in rows {
        let new_group = groups
            .last()
            .map_or(true, |group| group.attribute_id != row.attribute_id);
        if new_group {
            groups.push(VariantOptionGroup {
                attribute_id: row.attribute_id,
                attribute_name: row.attribute_name.clone(),
                attribute_code: row.attribute_code.clone(),
                options: Vec::new(),
            });
        }
        let Some(group) = groups.last_mut() else {
            continue;
        };

        match group.options.last_mut() {
            Some(option) if option.option_id == row.option_id => {
                option.linked_sku_ids.push(row.sku_id);
            }
            _ => group.options.push(VariantOption {
                option_id: row.option_id,
                option_value: row.option_value,
                option_code: row.option_code,
                linked_sku_ids: vec![row.sku_id],
            }),
        }
    }

    for option in groups.iter_mut().flat_map(|g| g.options.iter_mut()) {
        option.linked_sku_ids.sort();
        option.linked_sku_ids.dedup();
    }

    groups
}
