//! Restaurant front-of-house master data

use shared::models::{Device, Kitchen, NameX, Printer, Staff, Table, Zone};
use shared::{FieldType, FilterRequest};

use crate::services::MasterModule;

macro_rules! restaurant_module {
    (
        $module:ident, $model:ty, $name:literal, $route:literal,
        identity = $identity:ident,
        search = [$($field:literal),+ $(,)?]
        $(, filters = $filters:expr)?
    ) => {
        pub struct $module;

        impl MasterModule for $module {
            type Model = $model;

            const MODULE_NAME: &'static str = $name;
            const COLLECTION: &'static str = $name;
            const ROUTE: &'static str = $route;
            const IDENTITY_FIELD: &'static str = stringify!($identity);
            const SEARCH_FIELDS: &'static [&'static str] = &[$($field),+];
            $(const FILTERS: &'static [FilterRequest] = $filters;)?

            fn identity(model: &$model) -> String {
                model.$identity.clone()
            }

            fn names_mut(model: &mut $model) -> Option<&mut Vec<NameX>> {
                Some(&mut model.names)
            }
        }
    };
}

restaurant_module!(
    ZoneModule, Zone, "restaurant-zone", "/restaurant/zone",
    identity = code,
    search = ["code", "names.name"]
);

restaurant_module!(
    TableModule, Table, "restaurant-table", "/restaurant/table",
    identity = number,
    search = ["number", "names.name"]
);

restaurant_module!(
    PrinterModule, Printer, "restaurant-printer", "/restaurant/printer",
    identity = code,
    search = ["code", "names.name", "name1", "name2", "name3", "name4", "name5"]
);

restaurant_module!(
    KitchenModule, Kitchen, "restaurant-kitchen", "/restaurant/kitchen",
    identity = code,
    search = ["code", "names.name", "name1", "name2", "name3", "name4", "name5"],
    filters = &[FilterRequest::new("group-number", "groupnumber", FieldType::Int)]
);

restaurant_module!(
    DeviceModule, Device, "restaurant-device", "/restaurant/device",
    identity = code,
    search = ["code", "names.name"]
);

restaurant_module!(
    StaffModule, Staff, "restaurant-staff", "/restaurant/staff",
    identity = code,
    search = ["code", "names.name"]
);
