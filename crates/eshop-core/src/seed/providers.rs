// crates/eshop-core/src/seed/providers.rs

//! Sources of seed data. Seeders only see the traits; `Providers::select`
//! picks the implementation for a run.

use std::sync::Arc;

use rust_decimal::Decimal;

use super::model::{BrandData, CategoryNode, ProductData, StoreData, TagData};
use super::properties::SeedProperties;
use crate::config::DataSource;

pub trait CategoryDataProvider: Send + Sync {
    /// Root categories, each with its full subtree, in display order.
    fn category_hierarchy(&self) -> Vec<CategoryNode>;
    fn provider_name(&self) -> &'static str;
}

pub trait BrandDataProvider: Send + Sync {
    fn brands(&self) -> Vec<BrandData>;
    fn provider_name(&self) -> &'static str;
}

pub trait TagDataProvider: Send + Sync {
    fn tags(&self) -> Vec<TagData>;
    fn provider_name(&self) -> &'static str;
}

pub trait StoreDataProvider: Send + Sync {
    fn stores(&self) -> Vec<StoreData>;
    fn provider_name(&self) -> &'static str;
}

pub trait ProductDataProvider: Send + Sync {
    fn products(&self) -> Vec<ProductData>;
    fn provider_name(&self) -> &'static str;
}

/// The catalog compiled into the crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodeBasedCatalog;

const CODE_BASED: &str = "code-based";

impl CategoryDataProvider for CodeBasedCatalog {
    fn category_hierarchy(&self) -> Vec<CategoryNode> {
        use CategoryNode as N;

        vec![
            N::of(
                "Fashion & Apparel",
                vec![
                    N::with_children(
                        "Men",
                        &["T-Shirts", "Shirts", "Jeans & Trousers", "Ethnic Wear", "Innerwear & Sleepwear"],
                    ),
                    N::with_children(
                        "Women",
                        &["Tops & T-Shirts", "Dresses", "Sarees & Kurtis", "Jeans & Leggings", "Innerwear"],
                    ),
                    N::with_children("Kids", &["Boys Clothing", "Girls Clothing", "Infant Wear"]),
                    N::with_children(
                        "Footwear",
                        &["Casual Shoes", "Sports Shoes", "Formal Shoes", "Sandals & Slippers"],
                    ),
                    N::with_children(
                        "Accessories",
                        &["Bags & Wallets", "Belts", "Watches", "Sunglasses", "Jewelry"],
                    ),
                ],
            ),
            N::of(
                "Electronics",
                vec![
                    N::with_children(
                        "Mobiles & Accessories",
                        &["Smartphones", "Feature Phones", "Cases & Covers", "Chargers & Cables", "Power Banks"],
                    ),
                    N::with_children(
                        "Computers",
                        &["Laptops", "Desktops", "Monitors", "Keyboards & Mouse", "Storage Devices"],
                    ),
                    N::with_children(
                        "TV & Appliances",
                        &["Smart TVs", "Set-top Boxes", "Speakers", "Soundbars"],
                    ),
                    N::with_children("Cameras", &["DSLR", "Mirrorless", "Action Cameras"]),
                    N::with_children(
                        "Smart Devices",
                        &["Smart Watches", "Fitness Bands", "Smart Home Devices"],
                    ),
                ],
            ),
            N::of(
                "Home & Living",
                vec![
                    N::with_children("Furniture", &["Sofa", "Beds", "Tables & Chairs", "Wardrobes"]),
                    N::with_children(
                        "Home Decor",
                        &["Wall Art", "Lamps & Lighting", "Clocks", "Showpieces"],
                    ),
                    N::with_children("Kitchen & Dining", &["Cookware", "Dinner Sets", "Kitchen Tools"]),
                    N::with_children("Home Improvement", &["Electricals", "Plumbing", "Hardware Tools"]),
                ],
            ),
            N::of(
                "Beauty, Health & Personal Care",
                vec![
                    N::with_children("Beauty", &["Makeup", "Skincare", "Haircare", "Personal Care"]),
                    N::with_children("Grooming", &["Hygiene Products"]),
                    N::with_children(
                        "Health",
                        &["Supplements", "Medical Equipment", "Fitness Monitoring Devices"],
                    ),
                    N::with_children("Fragrances", &["Perfumes", "Deodorants"]),
                ],
            ),
            N::of(
                "Grocery & Essentials",
                vec![
                    N::with_children(
                        "Food",
                        &["Rice, Wheat & Pulses", "Snacks & Packaged Foods", "Spices"],
                    ),
                    N::with_children("Beverages", &["Tea & Coffee", "Soft Drinks", "Health Drinks"]),
                    N::with_children(
                        "Household Essentials",
                        &["Cleaning Supplies", "Detergents", "Paper Products"],
                    ),
                    N::of(
                        "Fruits & Vegetables",
                        vec![
                            N::of(
                                "Fresh Fruits",
                                vec![
                                    N::with_children(
                                        "Common Fruits",
                                        &["Apples", "Bananas", "Oranges", "Grapes"],
                                    ),
                                    N::with_children(
                                        "Seasonal Fruits",
                                        &["Mangoes", "Pomegranates", "Watermelon"],
                                    ),
                                    N::with_children(
                                        "Exotic Fruits",
                                        &["Kiwi", "Dragon Fruit", "Avocado", "Blueberries"],
                                    ),
                                ],
                            ),
                            N::of(
                                "Vegetables",
                                vec![
                                    N::with_children(
                                        "Leafy Vegetables",
                                        &["Spinach", "Lettuce", "Fenugreek", "Coriander"],
                                    ),
                                    N::with_children(
                                        "Root Vegetables",
                                        &["Potato", "Onion", "Carrot", "Beetroot"],
                                    ),
                                    N::with_children(
                                        "Gourds & Pods",
                                        &["Tomato", "Brinjal", "Lady Finger", "Bottle Gourd", "Beans"],
                                    ),
                                    N::with_children(
                                        "Cruciferous Vegetables",
                                        &["Cabbage", "Cauliflower", "Broccoli"],
                                    ),
                                    N::with_children(
                                        "Exotic Vegetables",
                                        &["Zucchini", "Bell Peppers", "Asparagus"],
                                    ),
                                    N::with_children(
                                        "Frozen & Processed Vegetables",
                                        &["Frozen Veg Mix", "Cut Vegetables"],
                                    ),
                                ],
                            ),
                            N::with_children(
                                "Dry Fruits",
                                &["Almonds", "Cashews", "Pistachios", "Raisins", "Dates"],
                            ),
                            N::with_children(
                                "Organic & Special",
                                &[
                                    "Organic Fruits",
                                    "Organic Vegetables",
                                    "Pesticide-Free Produce",
                                    "Hydroponic Produce",
                                ],
                            ),
                        ],
                    ),
                    N::leaf("Dairy"),
                ],
            ),
            N::of(
                "Sports, Fitness & Outdoor",
                vec![
                    N::with_children("Sports Equipment", &["Cricket", "Football", "Badminton"]),
                    N::with_children("Fitness", &["Gym Equipment", "Yoga Accessories"]),
                    N::with_children(
                        "Outdoor",
                        &["Camping Gear", "Trekking Equipment", "Cycling Accessories"],
                    ),
                ],
            ),
            N::of(
                "Toys, Kids & Baby",
                vec![
                    N::with_children("Toys", &["Educational Toys", "Action Figures", "Board Games"]),
                    N::with_children("Baby Care", &["Diapers", "Baby Food", "Baby Grooming"]),
                    N::with_children("Kids Essentials", &["School Bags", "Stationery"]),
                ],
            ),
            N::of(
                "Books, Office & Stationery",
                vec![
                    N::with_children(
                        "Books",
                        &["Academic", "Fiction", "Non-Fiction", "Competitive Exams"],
                    ),
                    N::with_children("Stationery", &["Pens & Notebooks", "Art Supplies"]),
                    N::with_children("Office Supplies", &["Printers", "Office Furniture"]),
                ],
            ),
            N::of(
                "Automotive",
                vec![
                    N::with_children(
                        "Vehicle Accessories",
                        &["Seat Covers", "Helmets", "Car Electronics"],
                    ),
                    N::with_children("Spare Parts", &["Engine Parts", "Tyres", "Batteries"]),
                    N::with_children("Tools", &["Car Care Tools", "Repair Kits"]),
                ],
            ),
            N::of(
                "Industrial & B2B",
                vec![
                    N::with_children("Machinery", &["Manufacturing Equipment"]),
                    N::with_children("Electricals", &["Switches", "Wires & Cables"]),
                    N::with_children("Safety", &["Helmets", "Gloves", "Industrial Shoes"]),
                    N::with_children("Packaging", &["Boxes", "Labels"]),
                ],
            ),
            N::of(
                "Digital Products",
                vec![
                    N::with_children("Software", &["Antivirus", "Business Tools"]),
                    N::with_children("Digital Content", &["E-books", "Music"]),
                    N::with_children("Online Services", &["Subscriptions", "Cloud Services"]),
                    N::with_children("Courses", &["Programming", "Design", "Marketing"]),
                ],
            ),
            N::of(
                "Luxury & Specialty",
                vec![
                    N::with_children("Luxury Fashion", &["Designer Wear"]),
                    N::with_children("Jewelry", &["Gold", "Diamond"]),
                    N::with_children("Collectibles", &["Art", "Antiques"]),
                    N::with_children("Handmade", &["Crafts", "Custom Products"]),
                ],
            ),
            N::with_children(
                "Services",
                &["Repairs & Maintenance", "Home Services", "Freelancing Services", "Event Services"],
            ),
        ]
    }

    fn provider_name(&self) -> &'static str {
        CODE_BASED
    }
}

impl BrandDataProvider for CodeBasedCatalog {
    fn brands(&self) -> Vec<BrandData> {
        vec![
            BrandData::of("Samsung", "Global electronics giant"),
            BrandData::of("Nike", "Leading sports brand"),
            BrandData::of("Apple", "Premium technology products"),
            BrandData::of("Adidas", "Sports and lifestyle brand"),
            BrandData::of("Puma", "Athletic and casual footwear"),
            BrandData::of("Sony", "Electronics and entertainment"),
            BrandData::of("LG", "Life's Good - Electronics"),
            BrandData::of("H&M", "Fashion and clothing"),
            BrandData::of("Zara", "Trendy fashion apparel"),
            BrandData::of("Dell", "Computer technology"),
        ]
    }

    fn provider_name(&self) -> &'static str {
        CODE_BASED
    }
}

impl TagDataProvider for CodeBasedCatalog {
    fn tags(&self) -> Vec<TagData> {
        ["new", "popular", "sale", "featured", "bestseller", "organic", "eco-friendly", "limited-edition"]
            .into_iter()
            .map(TagData::of)
            .collect()
    }

    fn provider_name(&self) -> &'static str {
        CODE_BASED
    }
}

impl StoreDataProvider for CodeBasedCatalog {
    fn stores(&self) -> Vec<StoreData> {
        vec![
            StoreData::full(
                "Tech Retail Store",
                "retail1",
                "Best electronics for consumers - retail prices only",
                "RETAILER",
            ),
            StoreData::full(
                "Mega Wholesale Center",
                "wholesale1",
                "Bulk products for businesses - wholesale prices only",
                "WHOLESALER",
            ),
            StoreData::full(
                "FlexiMart",
                "shop1",
                "One-stop shop - retail for small orders, wholesale for bulk",
                "BUSINESS",
            ),
            StoreData::full(
                "Green Valley Farm",
                "farmer1",
                "Fresh organic vegetables and fruits directly from farm",
                "FARMER",
            ),
        ]
    }

    fn provider_name(&self) -> &'static str {
        CODE_BASED
    }
}

impl ProductDataProvider for CodeBasedCatalog {
    fn products(&self) -> Vec<ProductData> {
        vec![
            ProductData::of(
                "Samsung Galaxy S24",
                "SAMSUNG-S24-001",
                Decimal::new(99999, 2),
                Decimal::new(89999, 2),
                "Electronics",
                "Samsung",
                "Tech Retail Store",
                &["new", "popular"],
            ),
            ProductData::of(
                "Nike Air Max",
                "NIKE-AIRMAX-001",
                Decimal::new(15000, 2),
                Decimal::new(12000, 2),
                "Sports Shoes",
                "Nike",
                "Tech Retail Store",
                &["sale"],
            ),
        ]
    }

    fn provider_name(&self) -> &'static str {
        CODE_BASED
    }
}

/// Seed data taken from the seed properties file. Shops become stores.
#[derive(Debug, Clone)]
pub struct PropertiesCatalog {
    properties: Arc<SeedProperties>,
}

const PROPERTIES_BASED: &str = "properties-based";

impl PropertiesCatalog {
    pub fn new(properties: Arc<SeedProperties>) -> Self {
        Self { properties }
    }
}

impl CategoryDataProvider for PropertiesCatalog {
    fn category_hierarchy(&self) -> Vec<CategoryNode> {
        self.properties.category_nodes()
    }

    fn provider_name(&self) -> &'static str {
        PROPERTIES_BASED
    }
}

impl BrandDataProvider for PropertiesCatalog {
    fn brands(&self) -> Vec<BrandData> {
        self.properties
            .brands
            .iter()
            .map(|b| BrandData {
                name: b.name.clone(),
                description: b.description.clone(),
                logo_url: b.logo_url.clone(),
            })
            .collect()
    }

    fn provider_name(&self) -> &'static str {
        PROPERTIES_BASED
    }
}

impl TagDataProvider for PropertiesCatalog {
    fn tags(&self) -> Vec<TagData> {
        self.properties
            .tags
            .iter()
            .map(|t| TagData {
                name: t.name.clone(),
            })
            .collect()
    }

    fn provider_name(&self) -> &'static str {
        PROPERTIES_BASED
    }
}

impl StoreDataProvider for PropertiesCatalog {
    fn stores(&self) -> Vec<StoreData> {
        self.properties
            .shops
            .iter()
            .map(|shop| StoreData {
                store_name: shop.shop_name.clone(),
                seller_username: shop.seller_username.clone().unwrap_or_default(),
                description: shop.description.clone(),
                seller_type: shop.seller_type.clone(),
                address: shop.address.clone(),
                phone: shop.phone.clone(),
                email: shop.email.clone(),
                logo_url: shop.logo_url.clone(),
            })
            .collect()
    }

    fn provider_name(&self) -> &'static str {
        PROPERTIES_BASED
    }
}

impl ProductDataProvider for PropertiesCatalog {
    fn products(&self) -> Vec<ProductData> {
        self.properties
            .products
            .iter()
            .map(|p| ProductData {
                name: p.name.clone(),
                sku: p.sku.clone().unwrap_or_else(|| generated_sku(&p.name)),
                description: p.description.clone(),
                price: p.price,
                discount_price: p.discount_price,
                stock_quantity: p.stock_quantity,
                category_name: p.category_name.clone(),
                brand_name: p.brand_name.clone(),
                store_name: p.shop_name.clone(),
                tags: p.tags.clone(),
                featured: p.featured,
                active: p.active,
            })
            .collect()
    }

    fn provider_name(&self) -> &'static str {
        PROPERTIES_BASED
    }
}

/// SKU for products configured without one: the upper-cased slug of the name.
fn generated_sku(name: &str) -> String {
    slug::slugify(name).to_ascii_uppercase()
}

/// The provider set a seeding run reads from.
#[derive(Clone)]
pub struct Providers {
    pub categories: Arc<dyn CategoryDataProvider>,
    pub brands: Arc<dyn BrandDataProvider>,
    pub tags: Arc<dyn TagDataProvider>,
    pub stores: Arc<dyn StoreDataProvider>,
    pub products: Arc<dyn ProductDataProvider>,
}

impl Providers {
    pub fn select(source: DataSource, properties: Arc<SeedProperties>) -> Self {
        match source {
            DataSource::Code => Self::code_based(),
            DataSource::Properties => Self::from_properties(properties),
        }
    }

    pub fn code_based() -> Self {
        let catalog = Arc::new(CodeBasedCatalog);
        Self {
            categories: catalog.clone(),
            brands: catalog.clone(),
            tags: catalog.clone(),
            stores: catalog.clone(),
            products: catalog,
        }
    }

    pub fn from_properties(properties: Arc<SeedProperties>) -> Self {
        let catalog = Arc::new(PropertiesCatalog::new(properties));
        Self {
            categories: catalog.clone(),
            brands: catalog.clone(),
            tags: catalog.clone(),
            stores: catalog.clone(),
            products: catalog,
        }
    }
}
