use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_uuid(Users::Id))
                    .col(string(Users::FirstName))
                    .col(string(Users::LastName))
                    .col(string_uniq(Users::Email))
                    .col(string(Users::PasswordHash))
                    .col(boolean(Users::IsAdmin))
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .col(timestamp_with_time_zone(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Places::Table)
                    .if_not_exists()
                    .col(pk_uuid(Places::Id))
                    .col(string(Places::Title))
                    .col(string_null(Places::Description))
                    .col(double(Places::Price))
                    .col(double(Places::Latitude))
                    .col(double(Places::Longitude))
                    .col(uuid(Places::OwnerId))
                    .col(timestamp_with_time_zone(Places::CreatedAt))
                    .col(timestamp_with_time_zone(Places::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_places_owner")
                            .from(Places::Table, Places::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Amenities::Table)
                    .if_not_exists()
                    .col(pk_uuid(Amenities::Id))
                    .col(string_uniq(Amenities::Name))
                    .col(timestamp_with_time_zone(Amenities::CreatedAt))
                    .col(timestamp_with_time_zone(Amenities::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(pk_uuid(Reviews::Id))
                    .col(string(Reviews::Text))
                    .col(small_integer(Reviews::Rating))
                    .col(uuid(Reviews::UserId))
                    .col(uuid(Reviews::PlaceId))
                    .col(timestamp_with_time_zone(Reviews::CreatedAt))
                    .col(timestamp_with_time_zone(Reviews::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_user")
                            .from(Reviews::Table, Reviews::UserId)
                            .to(Users::Table, Users::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_place")
                            .from(Reviews::Table, Reviews::PlaceId)
                            .to(Places::Table, Places::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One review per user per place.
        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_user_place")
                    .table(Reviews::Table)
                    .col(Reviews::UserId)
                    .col(Reviews::PlaceId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlaceAmenities::Table)
                    .if_not_exists()
                    .col(uuid(PlaceAmenities::PlaceId))
                    .col(uuid(PlaceAmenities::AmenityId))
                    .primary_key(
                        Index::create()
                            .col(PlaceAmenities::PlaceId)
                            .col(PlaceAmenities::AmenityId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_place_amenities_place")
                            .from(PlaceAmenities::Table, PlaceAmenities::PlaceId)
                            .to(Places::Table, Places::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_place_amenities_amenity")
                            .from(PlaceAmenities::Table, PlaceAmenities::AmenityId)
                            .to(Amenities::Table, Amenities::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlaceAmenities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Amenities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Places::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    PasswordHash,
    IsAdmin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Places {
    Table,
    Id,
    Title,
    Description,
    Price,
    Latitude,
    Longitude,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Amenities {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    Text,
    Rating,
    UserId,
    PlaceId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PlaceAmenities {
    Table,
    PlaceId,
    AmenityId,
}
