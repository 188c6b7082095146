use super::MerchantControlType;

/// Merchant control covering a spending category label, if any
pub fn merchant_control_for(category: &str) -> Option<MerchantControlType> {
    use MerchantControlType::*;

    let control = match category.trim().to_lowercase().as_str() {
        "dining" => MctDining,
        "groceries" | "grocery" => MctGrocery,
        "gas" | "gas_and_petroleum" => MctGasAndPetroleum,
        "entertainment" | "sport_and_recreation" => MctSportAndRecreation,
        "shopping" | "apparel" => MctApparelAndAccessories,
        "electronics" => MctElectronics,
        "hotels" | "hotel_and_lodging" => MctHotelAndLodging,
        "airfare" => MctAirfare,
        "alcohol" => MctAlcohol,
        "automotive" => MctAutomotive,
        "car_rental" => MctCarRental,
        "personal_care" => MctPersonalCare,
        "gambling" => MctGambling,
        "tobacco" => MctSmokeAndTobacco,
        "household" => MctHousehold,
        "adult_entertainment" => MctAdultEntertainment,
        _ => return None,
    };
    Some(control)
}
