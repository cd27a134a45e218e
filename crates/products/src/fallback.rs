//! Static catalog served when the product store cannot be reached.

use crate::product::CanonicalProduct;

const FALLBACK_CATALOG: &[(&str, &str, &str)] = &[
    ("P001", "Milk", "Dairy"),
    ("P002", "Bread", "Bakery"),
    ("P003", "Butter", "Dairy"),
    ("P004", "Cheese", "Dairy"),
    ("P005", "Yogurt", "Dairy"),
    ("P006", "Eggs", "Dairy"),
    ("P007", "Croissant", "Bakery"),
    ("P008", "Bagel", "Bakery"),
    ("P009", "Muffin", "Bakery"),
    ("P010", "Cookie", "Bakery"),
    ("P011", "Banana", "Fruit"),
    ("P012", "Apple", "Fruit"),
    ("P013", "Orange", "Fruit"),
    ("P014", "Grape", "Fruit"),
    ("P015", "Strawberry", "Fruit"),
    ("P016", "Chicken Breast", "Meat"),
    ("P017", "Ground Beef", "Meat"),
    ("P018", "Salmon", "Meat"),
    ("P019", "Shrimp", "Meat"),
    ("P020", "Turkey", "Meat"),
    ("P021", "Orange Juice", "Beverage"),
    ("P022", "Coffee", "Beverage"),
    ("P023", "Baked Beans", "Canned"),
    ("P024", "Tomato Sauce", "Canned"),
    ("P025", "Dish Soap", "Cleaning"),
    ("P026", "Laundry Detergent", "Cleaning"),
    ("P027", "Ice Cream", "Frozen"),
    ("P028", "Frozen Pizza", "Frozen"),
    ("P029", "Vitamins", "Health"),
    ("P030", "Moisturizer", "Health"),
    ("P031", "Cough Syrup", "Health"),
    ("P032", "Dog Food", "Pet"),
    ("P033", "Cat Food", "Pet"),
    ("P034", "Lettuce", "Produce"),
    ("P035", "Tomato", "Produce"),
    ("P036", "Potato Chips", "Snacks"),
    ("P037", "Chocolate Bar", "Snacks"),
];

/// The fixed product table loaded in place of the store's data.
pub fn fallback_catalog() -> Vec<CanonicalProduct> {
    FALLBACK_CATALOG
        .iter()
        .map(|(id, name, category)| CanonicalProduct::new(*id, *name, *category))
        .collect()
}
