//! Product Service - Business logic layer

use axum_helpers::{Page, PageQuery};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::form::ProductForm;
use crate::models::{Product, SearchQuery};
use crate::repository::ProductRepository;
use crate::storage::ImageStorage;

/// Product service providing business logic operations
///
/// Validates forms, keeps the image files in step with the rows, and
/// orchestrates repository operations.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
    images: Arc<dyn ImageStorage>,
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            images: Arc::clone(&self.images),
        }
    }
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R, images: Arc<dyn ImageStorage>) -> Self {
        Self {
            repository: Arc::new(repository),
            images,
        }
    }

    /// One page of products, newest first
    #[instrument(skip(self, query))]
    pub async fn list_products(&self, query: &PageQuery, path: &str) -> ProductResult<Page<Product>> {
        let total = self.repository.count().await?;
        let products = self.repository.list(query.limit(), query.offset()).await?;
        Ok(Page::new(products, total, query.page(), path))
    }

    /// Validate, store the image, then insert the row.
    #[instrument(skip(self, form))]
    pub async fn create_product(&self, form: ProductForm) -> ProductResult<Product> {
        let (input, upload) = form.for_create().into_new_product()?;

        let image = self.images.store(&upload).await?;
        let product = Product::new(input, Some(image.clone()));

        match self.repository.create(product).await {
            Ok(created) => Ok(created),
            Err(e) => {
                self.discard_image(&image).await;
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Patch a product. A new image is stored before the row is written;
    /// the old file goes once the update lands, the new one if it fails.
    #[instrument(skip(self, form))]
    pub async fn update_product(&self, id: Uuid, form: ProductForm) -> ProductResult<Product> {
        let mut product = self.get_product(id).await?;
        let (changes, upload) = form.for_update().into_changes()?;

        let mut replaced = None;
        let mut stored = None;
        if let Some(upload) = upload {
            let path = self.images.store(&upload).await?;
            replaced = product.image.replace(path.clone());
            stored = Some(path);
        }

        product.apply_changes(changes);
        match self.repository.update(product).await {
            Ok(updated) => {
                if let Some(old) = replaced {
                    self.discard_image(&old).await;
                }
                Ok(updated)
            }
            Err(e) => {
                if let Some(new) = stored {
                    self.discard_image(&new).await;
                }
                Err(e)
            }
        }
    }

    /// Hard delete, then remove the image file.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> ProductResult<()> {
        let product = self.get_product(id).await?;

        if !self.repository.delete(id).await? {
            return Err(ProductError::NotFound(id));
        }
        if let Some(image) = product.image {
            self.discard_image(&image).await;
        }

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &SearchQuery) -> ProductResult<Vec<Product>> {
        self.repository.search(query).await
    }

    /// Best-effort cleanup; failures are logged, never surfaced.
    async fn discard_image(&self, path: &str) {
        if let Err(e) = self.images.delete(path).await {
            tracing::warn!(image = %path, error = %e, "Failed to delete image file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::ImageUpload;
    use crate::repository::{InMemoryProductRepository, MockProductRepository};
    use crate::storage::{InMemoryImageStorage, MockImageStorage, StorageError};

    fn form(file: &str) -> ProductForm {
        ProductForm {
            sku: Some("111".to_string()),
            name: Some("Telefono".to_string()),
            quantity: Some("5".to_string()),
            price: Some("499.99".to_string()),
            description: Some("Smartphone".to_string()),
            image: Some(ImageUpload::new(file, vec![1u8, 2, 3])),
        }
    }

    fn service() -> (ProductService<InMemoryProductRepository>, InMemoryImageStorage) {
        let images = InMemoryImageStorage::new();
        let service = ProductService::new(InMemoryProductRepository::new(), Arc::new(images.clone()));
        (service, images)
    }

    #[tokio::test]
    async fn test_create_stores_image_and_row() {
        let (service, images) = service();

        let product = service.create_product(form("phone.png")).await.unwrap();

        let image = product.image.clone().unwrap();
        assert!(images.contains(&image).await);
        assert_eq!(service.get_product(product.id).await.unwrap(), product);
    }

    #[tokio::test]
    async fn test_create_rejects_gif_without_writing() {
        let (service, images) = service();

        let err = service.create_product(form("cat.gif")).await.unwrap_err();

        assert!(matches!(err, ProductError::Validation(_)));
        assert!(images.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_replaces_image() {
        let (service, images) = service();
        let product = service.create_product(form("phone.png")).await.unwrap();
        let old_image = product.image.clone().unwrap();

        let updated = service
            .update_product(
                product.id,
                ProductForm {
                    name: Some("Telefono Pro".to_string()),
                    image: Some(ImageUpload::new("new.JPG", vec![4u8])),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Telefono Pro");
        assert_eq!(updated.sku, 111);
        let new_image = updated.image.unwrap();
        assert_ne!(new_image, old_image);
        assert!(!images.contains(&old_image).await);
        assert!(images.contains(&new_image).await);
        assert_eq!(images.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_without_image_keeps_file() {
        let (service, images) = service();
        let product = service.create_product(form("phone.png")).await.unwrap();

        let updated = service
            .update_product(
                product.id,
                ProductForm {
                    quantity: Some("0".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.quantity, 0);
        assert_eq!(updated.image, product.image);
        assert_eq!(images.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found_before_validation() {
        let (service, _) = service();

        let err = service
            .update_product(
                Uuid::now_v7(),
                ProductForm {
                    price: Some("free".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_row_and_image() {
        let (service, images) = service();
        let product = service.create_product(form("phone.png")).await.unwrap();

        service.delete_product(product.id).await.unwrap();

        assert!(images.is_empty().await);
        assert!(matches!(
            service.get_product(product.id).await,
            Err(ProductError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_product(product.id).await,
            Err(ProductError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_insert_discards_stored_image() {
        let mut repo = MockProductRepository::new();
        repo.expect_create()
            .returning(|_| Err(ProductError::Internal("insert failed".to_string())));

        let images = InMemoryImageStorage::new();
        let service = ProductService::new(repo, Arc::new(images.clone()));

        assert!(service.create_product(form("phone.png")).await.is_err());
        assert!(images.is_empty().await);
    }

    #[tokio::test]
    async fn test_failed_update_keeps_old_image_and_discards_new() {
        let (seed, images) = service();
        let product = seed.create_product(form("phone.png")).await.unwrap();
        let old_image = product.image.clone().unwrap();

        let mut repo = MockProductRepository::new();
        let existing = product.clone();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_update()
            .times(1)
            .returning(|_| Err(ProductError::Internal("update failed".to_string())));

        let service = ProductService::new(repo, Arc::new(images.clone()));
        let result = service
            .update_product(
                product.id,
                ProductForm {
                    image: Some(ImageUpload::new("new.jpg", vec![4u8])),
                    ..Default::default()
                },
            )
            .await;

        assert!(result.is_err());
        assert!(images.contains(&old_image).await);
        assert_eq!(images.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_survives_image_cleanup_failure() {
        let (seed, _) = service();
        let product = seed.create_product(form("phone.png")).await.unwrap();

        let repo = InMemoryProductRepository::new();
        repo.create(product.clone()).await.unwrap();

        let mut images = MockImageStorage::new();
        images
            .expect_delete()
            .times(1)
            .returning(|_| Err(StorageError::Io(std::io::Error::other("read-only fs"))));

        let service = ProductService::new(repo, Arc::new(images));
        service.delete_product(product.id).await.unwrap();
    }
}
