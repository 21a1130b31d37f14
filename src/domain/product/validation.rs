use super::Product;
use crate::error::CatalogError;

/// Validates a bulk payload before anything is sent to the store.
///
/// The first offending product rejects the whole batch; the error names its index.
pub fn validate_products(products: &[Product]) -> Result<(), CatalogError> {
    if products.is_empty() {
        return Err(CatalogError::validation("Products array cannot be empty"));
    }

    for (idx, product) in products.iter().enumerate() {
        if let Some(problem) = field_problem(product) {
            return Err(CatalogError::validation(format!(
                "Product at index {}: {}",
                idx, problem
            )));
        }
    }
    Ok(())
}

fn field_problem(product: &Product) -> Option<&'static str> {
    if product.name.trim().is_empty() {
        return Some("name cannot be empty");
    }
    if product.category.trim().is_empty() {
        return Some("category cannot be empty");
    }
    if product.brand.trim().is_empty() {
        return Some("brand cannot be empty");
    }
    if product.price <= 0.0 {
        return Some("price must be greater than 0");
    }
    if product.images.is_empty() {
        return Some("images cannot be empty");
    }
    if product.inventory < 0 {
        return Some("inventory cannot be negative");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watch() -> Product {
        Product {
            id: None,
            name: "Titan Edge 1".to_string(),
            category: "watch".to_string(),
            brand: "titan".to_string(),
            price: 12999.0,
            description: String::new(),
            images: vec!["u".to_string()],
            inventory: 20,
            popularity: 4.5,
        }
    }

    fn message(err: CatalogError) -> String {
        match err {
            CatalogError::Validation(msg) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn accepts_a_valid_batch() {
        assert!(validate_products(&[watch(), watch()]).is_ok());
    }

    #[test]
    fn rejects_empty_batch() {
        let msg = message(validate_products(&[]).unwrap_err());
        assert_eq!(msg, "Products array cannot be empty");
    }

    #[test]
    fn reports_offending_index() {
        let mut bad = watch();
        bad.brand = "   ".to_string();
        let msg = message(validate_products(&[watch(), bad]).unwrap_err());
        assert_eq!(msg, "Product at index 1: brand cannot be empty");
    }

    #[test]
    fn rejects_non_positive_price() {
        for price in [0.0, -1.0] {
            let mut bad = watch();
            bad.price = price;
            let msg = message(validate_products(&[bad]).unwrap_err());
            assert_eq!(msg, "Product at index 0: price must be greater than 0");
        }
    }

    #[test]
    fn rejects_missing_images_and_negative_inventory() {
        let mut no_images = watch();
        no_images.images.clear();
        assert!(message(validate_products(&[no_images]).unwrap_err()).ends_with("images cannot be empty"));

        let mut negative = watch();
        negative.inventory = -3;
        assert!(message(validate_products(&[negative]).unwrap_err()).ends_with("inventory cannot be negative"));
    }

    #[test]
    fn zero_inventory_is_fine() {
        let mut p = watch();
        p.inventory = 0;
        assert!(validate_products(&[p]).is_ok());
    }
}
