use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(r#"
            INSERT INTO products (id, sku, name, quantity, price, description, image, created_at, updated_at)
            VALUES
                (
                    '01930b3c-7c5f-7000-8000-0000000000a1',
                    48213577,
                    'Computadora',
                    2,
                    500.00,
                    'Diseñado para un rendimiento duradero, el Lenovo IdeaPad 3i es el portátil perfecto para sus tareas diarias con funciones en las que puede confiar.',
                    'images/imagen1.png',
                    NOW(),
                    NOW()
                ),
                (
                    '01930b3c-7c5f-7001-8000-0000000000a2',
                    90331260,
                    'Telefono',
                    7,
                    200.00,
                    'El Motorola Moto G50 es un smartphone Android con una pantalla HD+ de 6.5 pulgadas. Por dentro, encontramos un procesador Snapdragon 480 de Qualcomm que provee conectividad 5G.',
                    'images/imagen2.png',
                    NOW(),
                    NOW()
                ),
                (
                    '01930b3c-7c5f-7002-8000-0000000000a3',
                    11764093,
                    'Audifonos',
                    10,
                    50.00,
                    'Los auriculares JBL TUNE500BT te permiten transmitir un sonido potente sin ataduras para hasta 16 horas de puro placer.',
                    'images/imagen3.png',
                    NOW(),
                    NOW()
                )
            ON CONFLICT (id) DO NOTHING
            "#)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
            DELETE FROM products WHERE id IN (
                '01930b3c-7c5f-7000-8000-0000000000a1',
                '01930b3c-7c5f-7001-8000-0000000000a2',
                '01930b3c-7c5f-7002-8000-0000000000a3'
            )
            "#,
            )
            .await?;

        Ok(())
    }
}
