//! Procedural macros for TableSync
//!
//! This crate provides the `#[derive(Entity)]` macro, which builds a
//! `TableDescriptor` for a struct from its attributes.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Fields, GenericArgument, Ident, LitBool,
    LitInt, LitStr, PathArguments, Type,
};

/// Derives `table_sync::Entity` for a struct with named fields.
///
/// # Struct Attributes
///
/// - `#[entity(table = "name")]` - Table name (required)
/// - `#[entity(comment = "...", charset = "utf8mb4", check = false)]`
/// - `#[entity(index(columns("a", "b"), fields("memberName"), unique, name = "ix"))]` -
///   Composite index, may be repeated
///
/// # Field Attributes
///
/// Only fields carrying `#[field]` or `#[id]` become columns.
///
/// - `#[field(name = "col", ty = "varchar", length = 64, decimal_length = 2)]`
/// - `#[field(nullable = false, unsigned, default = 0, default_str = "x")]`
/// - `#[field(comment = "...", index)]` or `#[field(index(unique, name = "ix"))]`
/// - `#[id]` / `#[id(auto_increment = false)]` - Primary key
#[proc_macro_derive(Entity, attributes(entity, field, id))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_entity_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_entity_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity derive only supports structs",
            ));
        }
    };

    let table = parse_entity_attrs(&input.attrs)?;

    let mut columns = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        if let Some(attrs) = parse_field_attrs(&field.attrs)? {
            columns.push(render_field(ident, &field.ty, attrs));
        }
    }

    let table_name = table.name.unwrap_or_default();
    let mut builder = quote! {
        ::table_sync::TableDescriptor::new(
            concat!(module_path!(), "::", stringify!(#name)),
            #table_name,
        )
    };
    if let Some(comment) = table.comment {
        builder = quote! { #builder.comment(#comment) };
    }
    if let Some(charset) = table.charset {
        builder = quote! { #builder.charset(#charset) };
    }
    if let Some(check) = table.check {
        builder = quote! { #builder.check(#check) };
    }
    for column in columns {
        builder = quote! { #builder.field(#column) };
    }
    for index in table.indices {
        builder = quote! { #builder.index(#index) };
    }

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::table_sync::models::Entity for #name #ty_generics #where_clause {
            fn table_descriptor() -> ::table_sync::TableDescriptor {
                #builder
            }
        }
    })
}

#[derive(Default)]
struct EntityAttrs {
    name: Option<String>,
    comment: Option<String>,
    charset: Option<String>,
    check: Option<bool>,
    indices: Vec<TokenStream2>,
}

#[derive(Default)]
struct FieldAttrs {
    name: Option<String>,
    column_type: Option<Ident>,
    length: Option<u32>,
    decimal_length: Option<u32>,
    nullable: Option<bool>,
    unsigned: bool,
    default_value: Option<i64>,
    default_str: Option<String>,
    comment: Option<String>,
    index: Option<TokenStream2>,
    primary_key: Option<bool>,
}

fn parse_entity_attrs(attrs: &[Attribute]) -> syn::Result<EntityAttrs> {
    let mut result = EntityAttrs::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("entity")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                result.name = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("comment") {
                result.comment = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("charset") {
                result.charset = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("check") {
                result.check = Some(parse_flag(&meta)?);
            } else if meta.path.is_ident("index") {
                result.indices.push(parse_composite_index(&meta)?);
            } else {
                return Err(meta.error("unknown entity attribute"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

fn parse_composite_index(meta: &ParseNestedMeta) -> syn::Result<TokenStream2> {
    let mut columns = Vec::new();
    let mut fields = Vec::new();
    let mut unique = false;
    let mut name = None;

    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("columns") {
            columns.extend(parse_string_list(&inner)?);
        } else if inner.path.is_ident("fields") {
            fields.extend(parse_string_list(&inner)?);
        } else if inner.path.is_ident("unique") {
            unique = parse_flag(&inner)?;
        } else if inner.path.is_ident("name") {
            name = Some(inner.value()?.parse::<LitStr>()?.value());
        } else {
            return Err(inner.error("unknown index attribute"));
        }
        Ok(())
    })?;

    let mut index = quote! {
        ::table_sync::CompositeIndexSpec {
            columns: vec![#(#columns.to_string()),*],
            fields: vec![#(#fields.to_string()),*],
            ..::core::default::Default::default()
        }
        .unique(#unique)
    };
    if let Some(name) = name {
        index = quote! { #index.named(#name) };
    }
    Ok(index)
}

/// Parse `key("a", "b")` into its string literals
fn parse_string_list(meta: &ParseNestedMeta) -> syn::Result<Vec<String>> {
    let content;
    syn::parenthesized!(content in meta.input);
    let list = content.parse_terminated(<LitStr as syn::parse::Parse>::parse, syn::Token![,])?;
    Ok(list.iter().map(LitStr::value).collect())
}

/// Parse either a bare `flag` or `flag = true|false`
fn parse_flag(meta: &ParseNestedMeta) -> syn::Result<bool> {
    if meta.input.peek(syn::Token![=]) {
        Ok(meta.value()?.parse::<LitBool>()?.value)
    } else {
        Ok(true)
    }
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<Option<FieldAttrs>> {
    let mut result = FieldAttrs::default();
    let mut managed = false;

    for attr in attrs {
        if attr.path().is_ident("id") {
            managed = true;
            let mut auto_increment = true;
            if !matches!(attr.meta, syn::Meta::Path(_)) {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("auto_increment") {
                        auto_increment = parse_flag(&meta)?;
                        Ok(())
                    } else {
                        Err(meta.error("unknown id attribute"))
                    }
                })?;
            }
            result.primary_key = Some(auto_increment);
        } else if attr.path().is_ident("field") {
            managed = true;
            // Handle empty attribute like #[field]
            if matches!(attr.meta, syn::Meta::Path(_)) {
                continue;
            }
            attr.parse_nested_meta(|meta| parse_field_meta(&meta, &mut result))?;
        }
    }

    Ok(managed.then_some(result))
}

fn parse_field_meta(meta: &ParseNestedMeta, result: &mut FieldAttrs) -> syn::Result<()> {
    if meta.path.is_ident("name") {
        result.name = Some(meta.value()?.parse::<LitStr>()?.value());
    } else if meta.path.is_ident("ty") {
        let lit = meta.value()?.parse::<LitStr>()?;
        result.column_type = Some(column_type_variant(&lit)?);
    } else if meta.path.is_ident("length") {
        result.length = Some(meta.value()?.parse::<LitInt>()?.base10_parse()?);
    } else if meta.path.is_ident("decimal_length") {
        result.decimal_length = Some(meta.value()?.parse::<LitInt>()?.base10_parse()?);
    } else if meta.path.is_ident("nullable") {
        result.nullable = Some(parse_flag(meta)?);
    } else if meta.path.is_ident("unsigned") {
        result.unsigned = parse_flag(meta)?;
    } else if meta.path.is_ident("default") {
        let value = meta.value()?;
        let negative = value.peek(syn::Token![-]);
        if negative {
            value.parse::<syn::Token![-]>()?;
        }
        let number: i64 = value.parse::<LitInt>()?.base10_parse()?;
        result.default_value = Some(if negative { -number } else { number });
    } else if meta.path.is_ident("default_str") {
        result.default_str = Some(meta.value()?.parse::<LitStr>()?.value());
    } else if meta.path.is_ident("comment") {
        result.comment = Some(meta.value()?.parse::<LitStr>()?.value());
    } else if meta.path.is_ident("index") {
        result.index = Some(parse_inline_index(meta)?);
    } else {
        return Err(meta.error("unknown field attribute"));
    }
    Ok(())
}

fn parse_inline_index(meta: &ParseNestedMeta) -> syn::Result<TokenStream2> {
    let mut unique = false;
    let mut name = None;

    if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| {
            if inner.path.is_ident("unique") {
                unique = parse_flag(&inner)?;
            } else if inner.path.is_ident("name") {
                name = Some(inner.value()?.parse::<LitStr>()?.value());
            } else {
                return Err(inner.error("unknown index attribute"));
            }
            Ok(())
        })?;
    }

    let mut index = if unique {
        quote! { ::table_sync::IndexSpec::unique() }
    } else {
        quote! { ::table_sync::IndexSpec::plain() }
    };
    if let Some(name) = name {
        index = quote! { #index.named(#name) };
    }
    Ok(index)
}

fn column_type_variant(lit: &LitStr) -> syn::Result<Ident> {
    let variant = match lit.value().to_ascii_lowercase().as_str() {
        "bigint" => "Bigint",
        "integer" | "int" => "Integer",
        "tinyint" => "Tinyint",
        "smallint" => "Smallint",
        "float" => "Float",
        "double" => "Double",
        "decimal" => "Decimal",
        "varchar" => "Varchar",
        "text" => "Text",
        "tinytext" => "Tinytext",
        "mediumtext" => "Mediumtext",
        "longtext" => "Longtext",
        "date" => "Date",
        "datetime" => "Datetime",
        "time" => "Time",
        "timestamp" => "Timestamp",
        "blob" => "Blob",
        other => {
            return Err(syn::Error::new(
                lit.span(),
                format!("unknown column type `{}`", other),
            ));
        }
    };
    Ok(Ident::new(variant, Span::call_site()))
}

fn render_field(ident: &Ident, ty: &Type, attrs: FieldAttrs) -> TokenStream2 {
    let member = ident.to_string();
    let kind = Ident::new(value_kind(ty), Span::call_site());

    let mut field = quote! {
        ::table_sync::FieldDescriptor::new(#member, ::table_sync::ValueKind::#kind)
    };
    if let Some(name) = attrs.name {
        field = quote! { #field.name(#name) };
    }
    if let Some(column_type) = attrs.column_type {
        field = quote! { #field.column_type(::table_sync::ColumnType::#column_type) };
    }
    if let Some(length) = attrs.length {
        field = quote! { #field.length(#length) };
    }
    if let Some(decimal_length) = attrs.decimal_length {
        field = quote! { #field.decimal_length(#decimal_length) };
    }
    if let Some(nullable) = attrs.nullable {
        field = quote! { #field.nullable(#nullable) };
    }
    if attrs.unsigned {
        field = quote! { #field.unsigned(true) };
    }
    if let Some(default_value) = attrs.default_value {
        field = quote! { #field.default_value(#default_value) };
    }
    if let Some(default_str) = attrs.default_str {
        field = quote! { #field.default_str(#default_str) };
    }
    if let Some(comment) = attrs.comment {
        field = quote! { #field.comment(#comment) };
    }
    if let Some(index) = attrs.index {
        field = quote! { #field.index(#index) };
    }
    if let Some(auto_increment) = attrs.primary_key {
        field = quote! { #field.primary_key(#auto_increment) };
    }
    field
}

/// Semantic value kind for a member type, looking through `Option<T>`
fn value_kind(ty: &Type) -> &'static str {
    let Type::Path(path) = ty else {
        if let Type::Reference(reference) = ty {
            return value_kind(&reference.elem);
        }
        return "Other";
    };
    let Some(segment) = path.path.segments.last() else {
        return "Other";
    };

    match segment.ident.to_string().as_str() {
        "Option" => first_type_argument(&segment.arguments)
            .map(value_kind)
            .unwrap_or("Other"),
        "Vec" => match first_type_argument(&segment.arguments) {
            Some(Type::Path(inner)) if inner.path.is_ident("u8") => "Blob",
            _ => "Other",
        },
        "i8" | "i16" | "i32" | "u8" | "u16" => "Int32",
        "i64" | "u32" | "u64" | "isize" | "usize" => "Int64",
        "f32" => "Float32",
        "f64" => "Float64",
        "Decimal" | "BigDecimal" => "Decimal",
        "NaiveDateTime" | "DateTime" | "NaiveDate" | "OffsetDateTime" | "PrimitiveDateTime"
        | "SystemTime" => "DateTime",
        "String" | "str" => "String",
        _ => "Other",
    }
}

fn first_type_argument(arguments: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}
