//! Multipart product form.
//!
//! Text fields arrive as strings and are checked with validator rules before
//! being converted; empty strings count as absent.

use axum::body::Bytes;
use axum::extract::Multipart;
use rust_decimal::Decimal;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::ProductResult;
use crate::models::{NewProduct, ProductChanges};

/// Accepted image extensions, compared case-insensitively
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "jpg", "png"];

/// Uploaded file as received
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ImageUpload {
    pub file_name: String,
    #[serde(skip)]
    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Lowercased extension, if the file name has one
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }

    pub fn has_allowed_extension(&self) -> bool {
        self.extension()
            .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
    }
}

fn allowed_image(upload: &ImageUpload) -> Result<(), ValidationError> {
    if upload.has_allowed_extension() {
        Ok(())
    } else {
        Err(ValidationError::new("mimes"))
    }
}

fn integer(value: &str) -> Result<(), ValidationError> {
    value
        .trim()
        .parse::<i64>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("integer"))
}

fn small_integer(value: &str) -> Result<(), ValidationError> {
    value
        .trim()
        .parse::<i32>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("integer"))
}

fn numeric(value: &str) -> Result<(), ValidationError> {
    Decimal::from_str(value.trim())
        .map(|_| ())
        .map_err(|_| ValidationError::new("numeric"))
}

/// Fields of a create request; everything is required.
#[derive(Debug, Clone, Default, Validate)]
pub struct CreateProductForm {
    #[validate(required, custom(function = "integer", message = "The sku must be an integer."))]
    pub sku: Option<String>,
    #[validate(required, length(max = 255))]
    pub name: Option<String>,
    #[validate(
        required,
        custom(function = "small_integer", message = "The quantity must be an integer.")
    )]
    pub quantity: Option<String>,
    #[validate(required, custom(function = "numeric", message = "The price must be a number."))]
    pub price: Option<String>,
    #[validate(required)]
    pub description: Option<String>,
    #[validate(
        required,
        custom(function = "allowed_image", message = "The image must be a file of type: pdf, jpg, png.")
    )]
    pub image: Option<ImageUpload>,
}

/// Fields of an update request; absent fields are left alone.
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateProductForm {
    #[validate(custom(function = "integer", message = "The sku must be an integer."))]
    pub sku: Option<String>,
    #[validate(length(max = 255))]
    pub name: Option<String>,
    #[validate(custom(function = "small_integer", message = "The quantity must be an integer."))]
    pub quantity: Option<String>,
    #[validate(custom(function = "numeric", message = "The price must be a number."))]
    pub price: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "allowed_image", message = "The image must be a file of type: pdf, jpg, png."))]
    pub image: Option<ImageUpload>,
}

/// Everything read off the wire, before choosing create or update rules.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub quantity: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub image: Option<ImageUpload>,
}

impl ProductForm {
    /// Drains a `multipart/form-data` body. Unknown fields are ignored; a
    /// file part with no name or no content counts as no image.
    pub async fn from_multipart(mut multipart: Multipart) -> ProductResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if name == "image" {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;
                form.image = file_name
                    .filter(|f| !f.is_empty() && !bytes.is_empty())
                    .map(|f| ImageUpload::new(f, bytes));
                continue;
            }

            let value = Some(field.text().await?).filter(|v| !v.trim().is_empty());
            match name.as_str() {
                "sku" => form.sku = value,
                "name" => form.name = value,
                "quantity" => form.quantity = value,
                "price" => form.price = value,
                "description" => form.description = value,
                other => tracing::debug!(field = %other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    pub fn for_create(self) -> CreateProductForm {
        CreateProductForm {
            sku: self.sku,
            name: self.name,
            quantity: self.quantity,
            price: self.price,
            description: self.description,
            image: self.image,
        }
    }

    pub fn for_update(self) -> UpdateProductForm {
        UpdateProductForm {
            sku: self.sku,
            name: self.name,
            quantity: self.quantity,
            price: self.price,
            description: self.description,
            image: self.image,
        }
    }
}

fn parse<T: FromStr>(field: &'static str, raw: Option<String>) -> Result<Option<T>, ValidationErrors> {
    raw.map(|v| {
        v.trim().parse::<T>().map_err(|_| {
            let mut errors = ValidationErrors::new();
            errors.add(field, ValidationError::new("invalid"));
            errors
        })
    })
    .transpose()
}

fn present<T>(field: &'static str, value: Option<T>) -> Result<T, ValidationErrors> {
    value.ok_or_else(|| {
        let mut errors = ValidationErrors::new();
        errors.add(field, ValidationError::new("required"));
        errors
    })
}

impl CreateProductForm {
    /// Validates, then converts into typed fields plus the image.
    pub fn into_new_product(self) -> Result<(NewProduct, ImageUpload), ValidationErrors> {
        self.validate()?;

        let product = NewProduct {
            sku: present("sku", parse("sku", self.sku)?)?,
            name: present("name", self.name)?,
            quantity: present("quantity", parse("quantity", self.quantity)?)?,
            price: present("price", parse("price", self.price)?)?,
            description: present("description", self.description)?,
        };
        Ok((product, present("image", self.image)?))
    }
}

impl UpdateProductForm {
    pub fn into_changes(self) -> Result<(ProductChanges, Option<ImageUpload>), ValidationErrors> {
        self.validate()?;

        let changes = ProductChanges {
            sku: parse("sku", self.sku)?,
            name: self.name,
            quantity: parse("quantity", self.quantity)?,
            price: parse("price", self.price)?,
            description: self.description,
        };
        Ok((changes, self.image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ProductForm {
        ProductForm {
            sku: Some("111".to_string()),
            name: Some("Telefono".to_string()),
            quantity: Some("5".to_string()),
            price: Some("499.99".to_string()),
            description: Some("Smartphone".to_string()),
            image: Some(ImageUpload::new("phone.PNG", vec![1u8, 2, 3])),
        }
    }

    #[test]
    fn test_extension_check_is_case_insensitive() {
        assert!(ImageUpload::new("a.PNG", vec![1u8]).has_allowed_extension());
        assert!(ImageUpload::new("a.jpg", vec![1u8]).has_allowed_extension());
        assert!(ImageUpload::new("scan.pdf", vec![1u8]).has_allowed_extension());
        assert!(!ImageUpload::new("a.gif", vec![1u8]).has_allowed_extension());
        assert!(!ImageUpload::new("jpg", vec![1u8]).has_allowed_extension());
        assert!(!ImageUpload::new("a.jpeg", vec![1u8]).has_allowed_extension());
    }

    #[test]
    fn test_complete_form_converts() {
        let (product, image) = complete().for_create().into_new_product().unwrap();

        assert_eq!(product.sku, 111);
        assert_eq!(product.quantity, 5);
        assert_eq!(product.price, Decimal::from_str("499.99").unwrap());
        assert_eq!(image.extension().as_deref(), Some("png"));
    }

    #[test]
    fn test_gif_rejected_even_when_rest_is_valid() {
        let mut form = complete();
        form.image = Some(ImageUpload::new("cat.gif", vec![1u8]));

        let errors = form.for_create().into_new_product().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields.len(), 1);
        assert_eq!(
            fields["image"][0].message.as_deref(),
            Some("The image must be a file of type: pdf, jpg, png.")
        );
    }

    #[test]
    fn test_missing_and_malformed_fields() {
        let form = ProductForm {
            sku: Some("abc".to_string()),
            price: Some("ten".to_string()),
            ..Default::default()
        };

        let errors = form.for_create().into_new_product().unwrap_err();
        let fields = errors.field_errors();
        for field in ["sku", "name", "quantity", "price", "description", "image"] {
            assert!(fields.contains_key(field), "missing error for {}", field);
        }
        assert_eq!(
            fields["sku"][0].message.as_deref(),
            Some("The sku must be an integer.")
        );
    }

    #[test]
    fn test_update_form_allows_partial() {
        let form = ProductForm {
            quantity: Some("7".to_string()),
            ..Default::default()
        };

        let (changes, image) = form.for_update().into_changes().unwrap();
        assert_eq!(changes.quantity, Some(7));
        assert!(changes.name.is_none());
        assert!(image.is_none());
    }

    #[test]
    fn test_update_form_rechecks_extension() {
        let form = ProductForm {
            image: Some(ImageUpload::new("x.bmp", vec![1u8])),
            ..Default::default()
        };

        assert!(form.for_update().into_changes().is_err());
    }
}
